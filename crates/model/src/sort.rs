//! Sort orders applicable to the elements of the data model.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// The sort orders supported for groups and row properties.
///
/// `Undefined` is the no-op order: compared elements are considered equal and a
/// stable sort leaves their sequence unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// No sort order; leaves the element sequence unchanged.
    #[default]
    #[serde(rename = "undefined")]
    Undefined,

    /// Case-insensitive string comparison.
    #[serde(rename = "lexical")]
    Lexical,

    /// Case-sensitive string comparison.
    #[serde(rename = "ASCII")]
    Ascii,

    /// Both operands are interpreted as floating point numbers where possible.
    /// Numbers sort ascending and precede all non-numbers; non-numbers fall
    /// back to ascending case-insensitive comparison among themselves.
    #[serde(rename = "numerical")]
    Numerical,

    /// The inverse sequence of `Lexical`.
    #[serde(rename = "inverseLexical")]
    InverseLexical,

    /// The inverse sequence of `Ascii`.
    #[serde(rename = "inverseASCII")]
    InverseAscii,

    /// Numbers still precede all non-numbers, but the numeric block sorts by
    /// falling value and the non-numbers in descending case-insensitive order.
    /// This is NOT the inverse sequence of `Numerical`.
    #[serde(rename = "inverseNumerical")]
    InverseNumerical,
}

impl SortOrder {
    /// Whether this order actually reorders anything.
    #[must_use]
    pub fn is_defined(self) -> bool {
        self != SortOrder::Undefined
    }
}

/// Case-insensitive comparison of two strings.
fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Numeric comparison of two strings.
///
/// The inverse numerical order is not achieved by exchanging the operands: in
/// both directions all numeric operands stay before all non-numeric ones. Only
/// the ordering inside the numeric and the non-numeric block is inverted.
fn cmp_numerically(a: &str, b: &str, inverse: bool) -> Ordering {
    let num_a = a.trim().parse::<f64>().ok();
    let num_b = b.trim().parse::<f64>().ok();
    match (num_a, num_b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if inverse {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            if inverse {
                cmp_ignore_case(b, a)
            } else {
                cmp_ignore_case(a, b)
            }
        }
    }
}

/// Compare two strings under the given sort order.
#[must_use]
pub fn compare_str(a: &str, b: &str, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Undefined => Ordering::Equal,
        SortOrder::Lexical => cmp_ignore_case(a, b),
        SortOrder::InverseLexical => cmp_ignore_case(b, a),
        SortOrder::Ascii => a.cmp(b),
        SortOrder::InverseAscii => b.cmp(a),
        SortOrder::Numerical => cmp_numerically(a, b, false),
        SortOrder::InverseNumerical => cmp_numerically(a, b, true),
    }
}

/// Numeric comparison of two cells, using the cells' numeric values where they
/// have any. The asymmetry of the inverse order is the same as for strings.
fn cmp_cells_numerically(a: &Cell, b: &Cell, inverse: bool) -> Ordering {
    match (a.number, b.number) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if inverse {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let order = if inverse {
                SortOrder::InverseLexical
            } else {
                SortOrder::Lexical
            };
            compare_cells(a, b, order)
        }
    }
}

/// Compare two cells under the given sort order.
///
/// The lexical family compares the textual representation regardless of the
/// cell type; a blank cell reads as the empty string. The numerical family
/// uses the numeric value and keeps numeric cells before non-numeric ones in
/// both directions.
#[must_use]
pub fn compare_cells(a: &Cell, b: &Cell, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Lexical | SortOrder::InverseLexical | SortOrder::Ascii | SortOrder::InverseAscii => {
            compare_str(a.as_str(), b.as_str(), order)
        }
        SortOrder::Numerical => cmp_cells_numerically(a, b, false),
        SortOrder::InverseNumerical => cmp_cells_numerically(a, b, true),
        SortOrder::Undefined => Ordering::Equal,
    }
}
