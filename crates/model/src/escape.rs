//! JSON-compatible escaping of cell text.

/// Render `text` as the contents of a JSON string literal.
///
/// The commonly used special characters get their short mnemonic escape, any
/// other control character and every code point at or above 0x7F becomes a
/// 4-hex-digit numeric escape (UTF-16 units, so a supplementary-plane code
/// point yields a surrogate pair). All remaining characters pass through.
#[must_use]
pub fn json_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (c as u32) >= 0x7F => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_escapes() {
        assert_eq!(json_escape("a\tb"), "a\\tb");
        assert_eq!(json_escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(json_escape("back\\slash"), "back\\\\slash");
        assert_eq!(json_escape("a/b"), "a\\/b");
        assert_eq!(json_escape("line\nbreak\r"), "line\\nbreak\\r");
    }

    #[test]
    fn control_characters_get_numeric_escapes() {
        assert_eq!(json_escape("\u{1}"), "\\u0001");
        assert_eq!(json_escape("\u{7f}"), "\\u007f");
    }

    #[test]
    fn non_ascii_gets_numeric_escapes() {
        assert_eq!(json_escape("ü"), "\\u00fc");
        // Supplementary plane: surrogate pair, like the UTF-16 based escaping
        // of common JSON emitters.
        assert_eq!(json_escape("\u{1F600}"), "\\ud83d\\ude00");
    }

    #[test]
    fn plain_ascii_passes_through() {
        assert_eq!(json_escape("plain text 123"), "plain text 123");
    }
}
