//! The typed representation of a single sheet cell.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

/// The semantic type of a cell's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Empty cell. Blank cells are not entered into row objects at all; a
    /// consumer asking for such a property gets nothing.
    #[default]
    Blank,

    /// Cell with Boolean contents.
    Bool,

    /// Cell with integral numeric value.
    Integer,

    /// Cell with real numeric value.
    Real,

    /// Cell with calendar date information.
    Date,

    /// Cell with text contents.
    Text,

    /// Cell with error information.
    Error,
}

/// A classified cell of the input sheet.
///
/// Every field is part of the model consumed by the templating layer; the
/// derived fields (`number`, `int`, `truth`, identifier forms, the membership
/// map `is`) are populated by the classifier, not by consumers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cell {
    /// The semantic type of the cell contents.
    pub kind: CellKind,

    /// Textual representation of the contents. `None` for blank cells.
    pub text: Option<String>,

    /// Numeric value; present for bool, integer, real and date cells.
    pub number: Option<f64>,

    /// Narrowed integer value; present only when `number` lies in i64 range.
    /// For real cells the presence additionally requires a lossless round
    /// trip, which promotes the kind to `Integer`.
    pub int: Option<i64>,

    /// Boolean interpretation of the contents, derived for every type: bools
    /// carry their value, numbers are true when nonzero, text is true when it
    /// equals one of "true", "yes", "okay" or "ok" (case-insensitive).
    pub truth: bool,

    /// Calendar value of a date cell.
    pub date: Option<NaiveDateTime>,

    /// The text contents coerced into a lenient identifier. Text cells only.
    pub ident: Option<String>,

    /// The text contents coerced into a strict identifier. Text cells only.
    pub ident_strict: Option<String>,

    /// Whether `ident` equals the original text verbatim.
    pub ident_equals: bool,

    /// Whether `ident_strict` equals the original text verbatim.
    pub ident_strict_equals: bool,

    /// JSON-escaped rendering of the text contents. Text cells only.
    pub json_text: Option<String>,

    /// Single-entry membership map keyed by the trimmed cell text. Lets a
    /// template ask "does this cell equal literal X" without a comparison
    /// operator: a missing key reads as false.
    pub is: HashMap<String, bool>,

    /// Comment attached to the cell, if any.
    pub comment: Option<String>,

    /// Author of the attached comment, if any.
    pub comment_author: Option<String>,

    /// 0-based row index of the cell in its sheet. Serialized 1-based, the
    /// way spreadsheet users count.
    #[serde(serialize_with = "one_based")]
    pub row: u32,

    /// 0-based column index of the cell in its sheet. Serialized 1-based.
    #[serde(serialize_with = "one_based")]
    pub col: u32,
}

pub(crate) fn one_based<S: serde::Serializer>(
    index: &u32,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(index + 1)
}

impl Cell {
    /// The textual representation, or the empty string for blank cells.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the cell holds any contents.
    #[must_use]
    pub fn is_not_blank(&self) -> bool {
        self.kind != CellKind::Blank
    }

    /// Whether the cell holds text contents.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == CellKind::Text
    }

    /// Whether the cell holds an integral numeric value.
    #[must_use]
    pub fn is_int(&self) -> bool {
        self.kind == CellKind::Integer
    }

    /// Whether the cell holds a real numeric value.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.kind == CellKind::Real
    }

    /// Whether the cell holds a calendar date.
    #[must_use]
    pub fn is_date(&self) -> bool {
        self.kind == CellKind::Date
    }

    /// Whether the cell holds a Boolean.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.kind == CellKind::Bool
    }

    /// Whether the cell holds error information.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == CellKind::Error
    }

    /// Membership test against the trimmed cell text.
    #[must_use]
    pub fn matches(&self, literal: &str) -> bool {
        self.is.get(literal).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cell_defaults() {
        let cell = Cell::default();
        assert_eq!(cell.kind, CellKind::Blank);
        assert!(!cell.is_not_blank());
        assert_eq!(cell.as_str(), "");
        assert!(!cell.truth);
        assert!(cell.is.is_empty());
    }

    #[test]
    fn membership_map_answers_without_panic() {
        let mut cell = Cell {
            kind: CellKind::Text,
            text: Some("modeA".to_string()),
            ..Cell::default()
        };
        cell.is.insert("modeA".to_string(), true);
        assert!(cell.matches("modeA"));
        assert!(!cell.matches("modeB"));
    }
}
