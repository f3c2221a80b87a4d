//! Classification of raw sheet values into typed cells.

use crate::cell::{Cell, CellKind};
use crate::datetime::{is_date_format, render_date, serial_to_datetime};
use crate::diag::ErrorCounter;
use crate::escape::json_escape;
use crate::ident::IdentCache;

/// Fixed text marker of an error cell.
pub const ERROR_CELL_TEXT: &str = "#error in cell";

/// An evaluated sheet value as handed over by a sheet source.
///
/// Formula cells arrive already evaluated; a formula the evaluator could not
/// handle arrives as `Unevaluable`. A source that distinguishes "missing"
/// from "present but empty" collapses both into `Blank`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Empty or missing cell.
    #[default]
    Blank,
    /// Boolean cell value.
    Bool(bool),
    /// Numeric cell value; dates are numbers plus a date display format.
    Number(f64),
    /// String cell value, untrimmed.
    Text(String),
    /// Evaluated error value of the cell.
    Error,
    /// The evaluator failed on this formula cell.
    Unevaluable,
}

/// One raw cell: the evaluated value plus its sheet-level context.
#[derive(Debug, Clone, Default)]
pub struct RawCell {
    /// The evaluated value.
    pub value: RawValue,
    /// The display format string attached to the cell, if any.
    pub format: Option<String>,
    /// Comment attached to the cell.
    pub comment: Option<String>,
    /// Author of the attached comment.
    pub comment_author: Option<String>,
    /// 0-based row index.
    pub row: u32,
    /// 0-based column index.
    pub col: u32,
}

/// Classify one raw cell into the typed model representation.
///
/// Never fails: an unevaluatable formula is downgraded to an error cell with
/// a counted warning, everything else maps structurally.
pub fn classify(raw: RawCell, idents: &mut IdentCache, counter: &mut ErrorCounter) -> Cell {
    let mut cell = Cell {
        row: raw.row,
        col: raw.col,
        comment: raw.comment,
        comment_author: raw.comment_author,
        ..Cell::default()
    };

    match raw.value {
        RawValue::Blank => {}

        RawValue::Bool(b) => {
            cell.kind = CellKind::Bool;
            cell.truth = b;
            cell.text = Some(if b { "true" } else { "false" }.to_string());
            cell.number = Some(if b { 1.0 } else { 0.0 });
        }

        RawValue::Number(v) => {
            cell.number = Some(v);
            let date_format = raw.format.as_deref().filter(|f| is_date_format(f));
            if let Some(format) = date_format {
                cell.kind = CellKind::Date;
                cell.date = serial_to_datetime(v);
                cell.text = Some(render_date(v, format));
            } else {
                cell.kind = CellKind::Real;
                cell.text = Some(v.to_string());
            }
            cell.truth = v != 0.0;
        }

        RawValue::Text(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                cell.kind = CellKind::Text;
                cell.truth = ["true", "yes", "okay", "ok"]
                    .iter()
                    .any(|t| trimmed.eq_ignore_ascii_case(t));
                cell.text = Some(trimmed.to_string());
            }
            // Empty after trimming means "no value", exactly like a blank
            // cell, not an empty text cell.
        }

        RawValue::Error => {
            cell.kind = CellKind::Error;
            cell.text = Some(ERROR_CELL_TEXT.to_string());
        }

        RawValue::Unevaluable => {
            counter.warning();
            tracing::warn!(
                row = raw.row + 1,
                col = raw.col + 1,
                "cell can't be evaluated and is handled like a cell with a data error"
            );
            cell.kind = CellKind::Error;
            cell.text = Some(ERROR_CELL_TEXT.to_string());
        }
    }

    // Find the best fitting integer representation of the numeric value and
    // refine the type: a real that round-trips losslessly becomes an integer.
    // Dates and bools keep their kind.
    // The upper bound must be strict: `i64::MAX as f64` rounds up to 2^63,
    // which is already out of range and would saturate the cast.
    if let Some(n) = cell.number {
        if n >= i64::MIN as f64 && n < i64::MAX as f64 {
            let narrowed = n as i64;
            cell.int = Some(narrowed);
            if cell.kind == CellKind::Real && narrowed as f64 == n {
                cell.kind = CellKind::Integer;
                cell.text = Some(narrowed.to_string());
            }
        }
    }

    if cell.kind == CellKind::Text {
        let text = cell.text.clone().unwrap_or_default();
        let ident = idents.identify(&text, false, counter);
        let ident_strict = idents.identify(&text, true, counter);
        cell.ident_equals = text == ident;
        cell.ident_strict_equals = text == ident_strict;
        cell.ident = Some(ident);
        cell.ident_strict = Some(ident_strict);
        cell.json_text = Some(json_escape(&text));
    }

    // The single-entry membership map, keyed by the trimmed text. Backs
    // "does this cell equal literal X" queries in the consuming layer.
    if let Some(key) = cell.text.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        cell.is.insert(key.to_string(), true);
    }

    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_value(value: RawValue) -> Cell {
        let mut idents = IdentCache::new();
        let mut counter = ErrorCounter::new();
        classify(
            RawCell {
                value,
                ..RawCell::default()
            },
            &mut idents,
            &mut counter,
        )
    }

    #[test]
    fn blank_stays_blank() {
        let cell = classify_value(RawValue::Blank);
        assert_eq!(cell.kind, CellKind::Blank);
        assert!(cell.text.is_none());
        assert!(cell.is.is_empty());
    }

    #[test]
    fn bool_gets_text_and_number() {
        let cell = classify_value(RawValue::Bool(true));
        assert_eq!(cell.kind, CellKind::Bool);
        assert_eq!(cell.as_str(), "true");
        assert_eq!(cell.number, Some(1.0));
        assert_eq!(cell.int, Some(1));
        assert!(cell.truth);
    }

    #[test]
    fn integral_number_narrows_to_integer() {
        let cell = classify_value(RawValue::Number(42.0));
        assert_eq!(cell.kind, CellKind::Integer);
        assert_eq!(cell.as_str(), "42");
        assert_eq!(cell.int, Some(42));
        assert_eq!(cell.number, Some(42.0));
    }

    #[test]
    fn fractional_number_stays_real() {
        let cell = classify_value(RawValue::Number(42.5));
        assert_eq!(cell.kind, CellKind::Real);
        assert_eq!(cell.as_str(), "42.5");
        assert_eq!(cell.int, Some(42));
        assert!(cell.truth);
    }

    #[test]
    fn huge_number_is_not_narrowed() {
        let cell = classify_value(RawValue::Number(1e300));
        assert_eq!(cell.kind, CellKind::Real);
        assert!(cell.int.is_none());
    }

    #[test]
    fn narrowing_excludes_the_saturation_boundary() {
        // 2^63 itself saturates the cast to a value one off; it must stay real.
        let cell = classify_value(RawValue::Number(9_223_372_036_854_775_808.0));
        assert_eq!(cell.kind, CellKind::Real);
        assert!(cell.int.is_none());

        // -2^63 is exactly representable and narrows losslessly.
        let cell = classify_value(RawValue::Number(-9_223_372_036_854_775_808.0));
        assert_eq!(cell.kind, CellKind::Integer);
        assert_eq!(cell.int, Some(i64::MIN));
    }

    #[test]
    fn date_formatted_number_becomes_date() {
        let mut idents = IdentCache::new();
        let mut counter = ErrorCounter::new();
        let cell = classify(
            RawCell {
                value: RawValue::Number(44562.0),
                format: Some("yyyy-mm-dd".to_string()),
                ..RawCell::default()
            },
            &mut idents,
            &mut counter,
        );
        assert_eq!(cell.kind, CellKind::Date);
        assert_eq!(cell.as_str(), "2022-01-01");
        assert!(cell.date.is_some());
        // Dates are never promoted to integer, but the narrowed value is kept.
        assert_eq!(cell.int, Some(44562));
    }

    #[test]
    fn text_is_trimmed_and_derived() {
        let cell = classify_value(RawValue::Text("  total price  ".to_string()));
        assert_eq!(cell.kind, CellKind::Text);
        assert_eq!(cell.as_str(), "total price");
        assert_eq!(cell.ident.as_deref(), Some("total_price"));
        assert_eq!(cell.ident_strict.as_deref(), Some("totalprice"));
        assert!(!cell.ident_equals);
        assert!(cell.matches("total price"));
        assert!(!cell.matches("total"));
    }

    #[test]
    fn whitespace_only_text_is_blank() {
        let cell = classify_value(RawValue::Text("   ".to_string()));
        assert_eq!(cell.kind, CellKind::Blank);
        assert!(cell.text.is_none());
    }

    #[test]
    fn text_truth_values() {
        for yes in ["true", "YES", "Okay", "ok"] {
            assert!(classify_value(RawValue::Text(yes.to_string())).truth, "{yes}");
        }
        assert!(!classify_value(RawValue::Text("no".to_string())).truth);
    }

    #[test]
    fn json_text_escapes_specials() {
        let cell = classify_value(RawValue::Text("a\t\"b\"".to_string()));
        assert_eq!(cell.json_text.as_deref(), Some("a\\t\\\"b\\\""));
    }

    #[test]
    fn unevaluable_downgrades_to_error_with_warning() {
        let mut idents = IdentCache::new();
        let mut counter = ErrorCounter::new();
        let cell = classify(
            RawCell {
                value: RawValue::Unevaluable,
                ..RawCell::default()
            },
            &mut idents,
            &mut counter,
        );
        assert_eq!(cell.kind, CellKind::Error);
        assert_eq!(cell.as_str(), ERROR_CELL_TEXT);
        assert_eq!(counter.warning_count(), 1);
        assert!(counter.is_clean());
    }
}
