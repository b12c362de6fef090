//! String escaping for the streamed value, in both directions.
//!
//! The producer side escapes each fragment as it is written. The consumer
//! side decodes whatever prefix of the raw value is available, stopping at
//! the first unescaped quote or at an escape sequence that has not fully
//! arrived yet.
//!
//! ```text
//! ┌───────────┬────────────┬──────────────────────────────────────────┐
//! │ Character │ Written as │ Notes                                    │
//! ├───────────┼────────────┼──────────────────────────────────────────┤
//! │ \         │ \\         │                                          │
//! │ "         │ \"         │                                          │
//! │ LF        │ \n         │                                          │
//! │ CR        │ \r         │                                          │
//! │ TAB       │ \t         │                                          │
//! │ other C0  │ \u00XX     │ keeps the completed object valid JSON    │
//! └───────────┴────────────┴──────────────────────────────────────────┘
//! ```
use std::fmt::Write as _;

const REPLACEMENT: char = '\u{FFFD}';

/// Escape `text` for the inside of a JSON string, appending to `out`.
pub fn escape_into(text: &str, out: &mut String) {
    let mut literal_start = 0;
    for (i, ch) in text.char_indices() {
        let replacement = match ch {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if c < '\u{20}' => {
                out.push_str(&text[literal_start..i]);
                let _ = write!(out, "\\u{:04x}", u32::from(c));
                literal_start = i + 1;
                continue;
            }
            _ => continue,
        };
        out.push_str(&text[literal_start..i]);
        out.push_str(replacement);
        // Every escaped character is a single byte.
        literal_start = i + 1;
    }
    out.push_str(&text[literal_start..]);
}

/// Escape `text` into a fresh string.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    escape_into(text, &mut out);
    out
}

/// Result of decoding the available prefix of a raw (still escaped) value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueScan {
    /// Unescaped text decoded from the raw input.
    pub text: String,

    /// Raw bytes consumed. Always lands on an escape boundary: either the
    /// end of the input, the start of an incomplete escape, or the
    /// terminating quote.
    pub consumed: usize,

    /// `true` when an unescaped `"` was found at `raw[consumed]`.
    pub closed: bool,
}

/// Decode the raw bytes of a string value that starts right after its
/// opening quote.
///
/// Escapes are consumed pairwise, so a quote is only a terminator when it
/// is preceded by an even-length run of backslashes. `\\"` closes the value;
/// `\"` does not. A trailing escape that has not fully arrived (`\`, `\u00`,
/// or a high surrogate waiting for its low half) is left unconsumed.
///
/// Escape characters outside the JSON set are passed through as written.
#[must_use]
pub fn scan_value(raw: &str) -> ValueScan {
    let bytes = raw.as_bytes();
    let mut text = String::with_capacity(raw.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                text.push_str(&raw[literal_start..i]);
                return ValueScan {
                    text,
                    consumed: i,
                    closed: true,
                };
            }
            b'\\' => {
                text.push_str(&raw[literal_start..i]);
                if let Some(len) = decode_escape(&raw[i..], &mut text) {
                    i += len;
                    literal_start = i;
                } else {
                    return ValueScan {
                        text,
                        consumed: i,
                        closed: false,
                    };
                }
            }
            _ => i += 1,
        }
    }

    text.push_str(&raw[literal_start..]);
    ValueScan {
        text,
        consumed: bytes.len(),
        closed: false,
    }
}

/// Decode one escape sequence at the start of `s` (which begins with `\`).
///
/// Returns the number of raw bytes consumed, or `None` if more input is
/// needed before the sequence can be decoded.
fn decode_escape(s: &str, out: &mut String) -> Option<usize> {
    let &selector = s.as_bytes().get(1)?;
    let decoded = match selector {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{8}',
        b'f' => '\u{c}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return decode_unicode_escape(s, out),
        _ => {
            let ch = s[1..].chars().next()?;
            out.push('\\');
            out.push(ch);
            return Some(1 + ch.len_utf8());
        }
    };
    out.push(decoded);
    Some(2)
}

enum HexUnit {
    Complete(u16),
    Partial,
    Invalid,
}

fn hex_unit(s: &str) -> HexUnit {
    let bytes = s.as_bytes();
    let available = bytes.len().min(4);
    if !bytes[..available].iter().all(u8::is_ascii_hexdigit) {
        return HexUnit::Invalid;
    }
    if available < 4 {
        return HexUnit::Partial;
    }
    u16::from_str_radix(&s[..4], 16).map_or(HexUnit::Invalid, HexUnit::Complete)
}

/// `s` starts with `\u`.
fn decode_unicode_escape(s: &str, out: &mut String) -> Option<usize> {
    let unit = match hex_unit(&s[2..]) {
        HexUnit::Complete(unit) => unit,
        HexUnit::Partial => return None,
        HexUnit::Invalid => {
            out.push_str("\\u");
            return Some(2);
        }
    };

    if (0xD800..0xDC00).contains(&unit) {
        let rest = &s[6..];
        let low = match rest.as_bytes() {
            [] | [b'\\'] => HexUnit::Partial,
            [b'\\', b'u', ..] => hex_unit(&rest[2..]),
            _ => HexUnit::Invalid,
        };
        return match low {
            HexUnit::Complete(low) if (0xDC00..0xE000).contains(&low) => {
                let code =
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                out.push(char::from_u32(code).unwrap_or(REPLACEMENT));
                Some(12)
            }
            HexUnit::Partial => None,
            _ => {
                out.push(REPLACEMENT);
                Some(6)
            }
        };
    }

    out.push(char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT));
    Some(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_wire_characters() {
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape("one\ntwo\r\n\tthree"), "one\\ntwo\\r\\n\\tthree");
    }

    #[test]
    fn escapes_other_control_characters_as_unicode() {
        assert_eq!(escape("bell\u{7}"), "bell\\u0007");
        assert_eq!(escape("\u{1f}"), "\\u001f");
    }

    #[test]
    fn leaves_multibyte_text_alone() {
        assert_eq!(escape("cómo estás? ¿ñ? 🚀"), "cómo estás? ¿ñ? 🚀");
    }

    #[test]
    fn escaped_text_is_valid_json_string_body() {
        let text = "tab\there \"quoted\" back\\slash \u{0}\u{1b} end";
        let json = format!("\"{}\"", escape(text));
        // Decoding the escaped form gives back the original text.
        let scan = scan_value(&json[1..]);
        assert!(scan.closed);
        assert_eq!(scan.text, text);
        assert_eq!(scan.consumed, json.len() - 2);
    }

    #[test]
    fn scan_stops_at_terminator() {
        let scan = scan_value("Hola!\", \"currentWord\": null}");
        assert_eq!(scan.text, "Hola!");
        assert_eq!(scan.consumed, 5);
        assert!(scan.closed);
    }

    #[test]
    fn scan_open_value_consumes_everything() {
        let scan = scan_value("still going");
        assert_eq!(scan.text, "still going");
        assert_eq!(scan.consumed, 11);
        assert!(!scan.closed);
    }

    #[test]
    fn escaped_quote_is_not_a_terminator() {
        let scan = scan_value(r#"a \"b\" c"#);
        assert_eq!(scan.text, "a \"b\" c");
        assert!(!scan.closed);
    }

    #[test]
    fn escaped_backslash_then_real_terminator() {
        // Two backslashes (even run) before the quote: the quote is real.
        let scan = scan_value(r#"dir\\"}"#);
        assert_eq!(scan.text, "dir\\");
        assert_eq!(scan.consumed, 5);
        assert!(scan.closed);
    }

    #[test]
    fn three_backslashes_escape_the_quote() {
        let scan = scan_value(r#"x\\\"y"#);
        assert_eq!(scan.text, "x\\\"y");
        assert!(!scan.closed);
    }

    #[test]
    fn trailing_backslash_is_held_back() {
        let scan = scan_value("abc\\");
        assert_eq!(scan.text, "abc");
        assert_eq!(scan.consumed, 3);
        assert!(!scan.closed);
    }

    #[test]
    fn partial_unicode_escape_is_held_back() {
        let scan = scan_value("caf\\u00");
        assert_eq!(scan.text, "caf");
        assert_eq!(scan.consumed, 3);

        let scan = scan_value("caf\\u00e9!");
        assert_eq!(scan.text, "café!");
        assert_eq!(scan.consumed, 10);
    }

    #[test]
    fn surrogate_pair_waits_for_low_half() {
        let scan = scan_value("\\ud83d");
        assert_eq!(scan.text, "");
        assert_eq!(scan.consumed, 0);

        let scan = scan_value("\\ud83d\\ude");
        assert_eq!(scan.consumed, 0);

        let scan = scan_value("\\ud83d\\ude80");
        assert_eq!(scan.text, "🚀");
        assert_eq!(scan.consumed, 12);
    }

    #[test]
    fn lone_high_surrogate_becomes_replacement() {
        let scan = scan_value("\\ud83dx\"");
        assert_eq!(scan.text, "\u{FFFD}x");
        assert!(scan.closed);
    }

    #[test]
    fn unknown_escape_passes_through() {
        let scan = scan_value("\\q\\é\"");
        assert_eq!(scan.text, "\\q\\é");
        assert!(scan.closed);
    }

    #[test]
    fn malformed_unicode_escape_passes_through() {
        let scan = scan_value("\\uZZ\"");
        assert_eq!(scan.text, "\\uZZ");
        assert!(scan.closed);
    }
}
