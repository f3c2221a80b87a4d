//! Excel serial date handling.
//!
//! Numeric cells carry no type of their own; whether they are calendar dates
//! is decided by the display format attached to the cell. This module holds
//! the format heuristic, the serial-to-calendar conversion and a best-effort
//! rendering of the date through the cell's own format string.

use chrono::{DateTime, NaiveDateTime};

/// Days between 1900-01-01 (Excel day 1 base) and 1970-01-01.
const EXCEL_EPOCH: i64 = 25569;

/// Whether a display format string marks its cell as a calendar date.
///
/// Date/time tokens are looked for outside quoted literals and outside
/// bracketed sections (color tags, locale prefixes). A lone `m` is ambiguous
/// between month and minute and only counts when a `:` indicates a time.
#[must_use]
pub fn is_date_format(pattern: &str) -> bool {
    let cleaned = strip_literals(pattern);
    let lower = cleaned.to_ascii_lowercase();

    if lower.contains('y') || lower.contains('d') || lower.contains('h') || lower.contains('s') {
        return true;
    }

    if lower.contains('m') {
        return lower.contains(':');
    }

    false
}

/// Convert an Excel serial date to a calendar value.
///
/// Returns `None` for serials outside the representable range.
#[must_use]
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let days = serial.floor() as i64;
    let time_fraction = serial - serial.floor();
    let unix_days = days - EXCEL_EPOCH;
    let unix_seconds = unix_days.checked_mul(86400)?.checked_add((time_fraction * 86400.0) as i64)?;
    DateTime::from_timestamp(unix_seconds, 0).map(|dt| dt.naive_utc())
}

/// Render a serial date through the cell's display format string.
///
/// Common Excel tokens are translated to their chrono counterparts; quoted
/// literals pass through verbatim, bracketed sections are dropped. The
/// rendering only resembles what the spreadsheet application would show, the
/// two format languages are not fully compatible. Falls back to the plain
/// decimal rendering when the serial is out of range.
#[must_use]
pub fn render_date(serial: f64, pattern: &str) -> String {
    let Some(dt) = serial_to_datetime(serial) else {
        return serial.to_string();
    };
    dt.format(&translate_pattern(pattern)).to_string()
}

/// Translate a display format string into a chrono pattern, section by
/// section: token runs go through the token replacement, quoted literals are
/// carried over as literal text, bracketed sections and the trailing `;@`
/// text section are dropped.
fn translate_pattern(pattern: &str) -> String {
    let input = pattern.strip_suffix(";@").unwrap_or(pattern);
    let mut out = String::with_capacity(input.len());
    let mut tokens = String::new();
    let mut in_quotes = false;
    let mut in_brackets = false;
    for ch in input.chars() {
        match ch {
            '"' if !in_brackets => {
                in_quotes = !in_quotes;
                if in_quotes {
                    out.push_str(&excel_pattern_to_chrono(&tokens));
                    tokens.clear();
                }
            }
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if in_quotes => {
                if ch == '%' {
                    out.push_str("%%");
                } else {
                    out.push(ch);
                }
            }
            _ if !in_brackets => tokens.push(ch),
            _ => {}
        }
    }
    out.push_str(&excel_pattern_to_chrono(&tokens));
    out
}

/// Drop quoted literals, bracketed sections and the trailing `;@` text
/// section from a format string.
fn strip_literals(input: &str) -> String {
    let input = input.strip_suffix(";@").unwrap_or(input);
    let mut out = String::with_capacity(input.len());
    let mut in_quotes = false;
    let mut in_brackets = false;
    for ch in input.chars() {
        match ch {
            '"' if !in_brackets => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if !in_quotes && !in_brackets => out.push(ch),
            _ => {}
        }
    }
    out
}

fn excel_pattern_to_chrono(pattern: &str) -> String {
    let mut out = pattern.to_ascii_lowercase();

    // An `m` next to a `:` is a minute, not a month; claim those before the
    // generic replacements run.
    let minute_replacements = [
        ("h:mm", "h:{MIN}"),
        ("mm:s", "{MIN}:s"),
        ("h:m", "h:{MIN1}"),
        ("m:s", "{MIN1}:s"),
    ];
    for (excel, placeholder) in minute_replacements {
        out = out.replace(excel, placeholder);
    }

    let replacements = [
        ("yyyy", "{YYYY}"),
        ("yy", "{YY}"),
        ("mmmm", "{MMMM}"),
        ("mmm", "{MMM}"),
        ("mm", "{MM}"),
        ("m", "{M}"),
        ("dddd", "{DDDD}"),
        ("ddd", "{DDD}"),
        ("dd", "{DD}"),
        ("d", "{D}"),
        ("hh", "{HH}"),
        ("h", "{H}"),
        ("ss", "{SS}"),
        ("s", "{S}"),
    ];

    for (excel, placeholder) in replacements {
        out = out.replace(excel, placeholder);
    }

    let chrono_replacements = [
        ("{MIN}", "%M"),
        ("{MIN1}", "%-M"),
        ("{YYYY}", "%Y"),
        ("{YY}", "%y"),
        ("{MMMM}", "%B"),
        ("{MMM}", "%b"),
        ("{MM}", "%m"),
        ("{M}", "%-m"),
        ("{DDDD}", "%A"),
        ("{DDD}", "%a"),
        ("{DD}", "%d"),
        ("{D}", "%-d"),
        ("{HH}", "%H"),
        ("{H}", "%-H"),
        ("{SS}", "%S"),
        ("{S}", "%-S"),
    ];

    for (placeholder, chrono) in chrono_replacements {
        out = out.replace(placeholder, chrono);
    }

    out
}
