//! Identifier derivation for names taken from sheet contents.
//!
//! Names read from a sheet (column titles, cell texts, tab names) routinely
//! contain blanks and special characters, which break when the model is
//! rendered as program code. They are therefore offered in identifier form,
//! in two variants: a lenient one following the common C rules and a strict
//! one that additionally bans the underscore.
//!
//! Derivation is memoized per workbook in an [`IdentCache`], which also keeps
//! the derived identifiers unique: two different names never map to the same
//! identifier within one workbook.

use std::collections::HashMap;

use crate::diag::ErrorCounter;

/// Bound on suffix attempts when disambiguating a clashing identifier.
const MAX_DISAMBIGUATION_ATTEMPTS: u32 = 10_000;

/// Whether `name` already is a lenient identifier: a letter or underscore
/// followed by letters, digits or underscores.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `name` already is a strict identifier: a letter followed by
/// letters or digits.
#[must_use]
pub fn is_strict_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}

/// Best-effort transliteration of a name into identifier shape, still
/// disregarding possible clashes with other derived identifiers.
///
/// Whitespace runs become an underscore (lenient) or nothing (strict); runs
/// of any other unpermitted character become a single `x`. A leading digit or
/// an empty remainder gets a `_` (lenient) or `x` (strict) prepended.
fn make_identifier(name: &str, strict: bool) -> String {
    let trimmed = name.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    if trimmed.is_empty() || trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        out.push(if strict { 'x' } else { '_' });
    }

    let mut in_space = false;
    let mut in_bad = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space && !strict {
                out.push('_');
            }
            in_space = true;
            in_bad = false;
        } else if c.is_ascii_alphanumeric() || (!strict && c == '_') {
            out.push(c);
            in_space = false;
            in_bad = false;
        } else {
            if !in_bad {
                out.push('x');
            }
            in_bad = true;
            in_space = false;
        }
    }

    debug_assert!(if strict {
        is_strict_identifier(&out)
    } else {
        is_identifier(&out)
    });
    out
}

/// Memoization table for identifier derivation, scoped to one workbook and
/// torn down when moving to the next.
///
/// The lenient and the strict identifiers span independent namespaces; each
/// direction of the association is kept to implement uniqueness.
#[derive(Debug, Default)]
pub struct IdentCache {
    name_by_ident: HashMap<String, String>,
    ident_by_name: HashMap<String, String>,
    name_by_strict: HashMap<String, String>,
    strict_by_name: HashMap<String, String>,
}

impl IdentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the identifier form of `name`.
    ///
    /// A name that already is an identifier is returned unchanged and not
    /// recorded. Otherwise the derived identifier is disambiguated against
    /// all identifiers handed out before; failing to find a free candidate
    /// within the attempt bound is counted as an error and the last candidate
    /// is returned regardless.
    pub fn identify(&mut self, name: &str, strict: bool, counter: &mut ErrorCounter) -> String {
        let already = if strict {
            is_strict_identifier(name)
        } else {
            is_identifier(name)
        };
        if already {
            return name.to_string();
        }

        let (name_by_ident, ident_by_name) = if strict {
            (&mut self.name_by_strict, &mut self.strict_by_name)
        } else {
            (&mut self.name_by_ident, &mut self.ident_by_name)
        };

        if let Some(ident) = ident_by_name.get(name) {
            return ident.clone();
        }

        let stem = make_identifier(name, strict);
        let separator = if strict { "x" } else { "_" };
        let mut candidate = stem.clone();
        let mut attempt: u32 = 0;
        while name_by_ident.contains_key(&candidate) {
            attempt += 1;
            if attempt > MAX_DISAMBIGUATION_ATTEMPTS {
                counter.error();
                tracing::error!(
                    name,
                    "no unambiguous identifier could be found; the input data is heavily \
                     ambiguous and needs to be modified"
                );
                return candidate;
            }
            candidate = format!("{stem}{separator}{attempt}");
        }

        tracing::debug!(name, ident = candidate.as_str(), "associated name with identifier");
        name_by_ident.insert(candidate.clone(), name.to_string());
        ident_by_name.insert(name.to_string(), candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_identifiers() {
        assert!(is_identifier("abc_123"));
        assert!(is_identifier("_abc"));
        assert!(!is_identifier("9abc"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a b"));

        assert!(is_strict_identifier("abc123"));
        assert!(!is_strict_identifier("_abc"));
        assert!(!is_strict_identifier("abc_123"));
    }

    #[test]
    fn lenient_transliteration() {
        let mut cache = IdentCache::new();
        let mut counter = ErrorCounter::new();
        assert_eq!(cache.identify("my name", false, &mut counter), "my_name");
        assert_eq!(cache.identify("a - b", false, &mut counter), "a_x_b");
        assert_eq!(cache.identify("9lives", false, &mut counter), "_9lives");
        assert!(counter.is_clean());
    }

    #[test]
    fn strict_transliteration() {
        let mut cache = IdentCache::new();
        let mut counter = ErrorCounter::new();
        assert_eq!(cache.identify("my name", true, &mut counter), "myname");
        assert_eq!(cache.identify("9lives", true, &mut counter), "x9lives");
        assert_eq!(cache.identify("a-b", true, &mut counter), "axb");
        assert!(counter.is_clean());
    }

    #[test]
    fn identity_is_memoized() {
        let mut cache = IdentCache::new();
        let mut counter = ErrorCounter::new();
        let first = cache.identify("total price", false, &mut counter);
        let second = cache.identify("total price", false, &mut counter);
        assert_eq!(first, second);
    }

    #[test]
    fn clashes_get_numeric_suffixes() {
        let mut cache = IdentCache::new();
        let mut counter = ErrorCounter::new();
        // Both names collapse to the same stem "a_b".
        assert_eq!(cache.identify("a b", false, &mut counter), "a_b");
        assert_eq!(cache.identify("a\tb", false, &mut counter), "a_b_1");
        assert_eq!(cache.identify("a  b", false, &mut counter), "a_b_2");
        assert!(counter.is_clean());
    }

    #[test]
    fn already_identifier_passes_through() {
        let mut cache = IdentCache::new();
        let mut counter = ErrorCounter::new();
        assert_eq!(cache.identify("already_fine", false, &mut counter), "already_fine");
    }
}
