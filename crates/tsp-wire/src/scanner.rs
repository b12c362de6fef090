/// Incremental structural scanner for a progressively written JSON object.
///
/// Tracks three quantities over every byte fed so far: brace depth, whether
/// the scan position is inside a string literal, and the length of the
/// current backslash run (only meaningful inside a string). A quote toggles
/// the string state only when the run preceding it has even length.
///
/// The state persists between calls, so each byte is scanned exactly once
/// no matter how many chunks the object arrives in.
///
/// ```text
///   bytes:  {"response": "a \" }", "x": {}}
///   depth:  1            (inside string: ignored)  2 1 0
///   ───────────────────────────────────────────────────────
///   balanced once depth == 0, outside a string, and at least
///   one '{' and one '}' have been seen
/// ```
///
/// Balance is necessary but not sufficient for a complete object: callers
/// must still run a full parse before trusting it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuralScanner {
    depth: i64,
    in_string: bool,
    backslash_run: usize,
    seen_open: bool,
    seen_close: bool,
}

impl StructuralScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan newly appended bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.in_string {
                match byte {
                    b'\\' => {
                        self.backslash_run += 1;
                        continue;
                    }
                    b'"' if self.backslash_run % 2 == 0 => self.in_string = false,
                    _ => {}
                }
                self.backslash_run = 0;
                continue;
            }

            match byte {
                b'"' => {
                    self.in_string = true;
                    self.backslash_run = 0;
                }
                b'{' => {
                    self.depth += 1;
                    self.seen_open = true;
                }
                b'}' => {
                    self.depth -= 1;
                    self.seen_close = true;
                }
                _ => {}
            }
        }
    }

    /// Whether everything scanned so far could be one complete object.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && !self.in_string && self.seen_open && self.seen_close
    }

    /// Current brace depth. Negative after a stray `}`.
    #[must_use]
    pub fn depth(&self) -> i64 {
        self.depth
    }

    #[must_use]
    pub fn in_string(&self) -> bool {
        self.in_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(text: &str) -> StructuralScanner {
        let mut scanner = StructuralScanner::new();
        scanner.feed(text.as_bytes());
        scanner
    }

    #[test]
    fn empty_input_is_not_balanced() {
        assert!(!StructuralScanner::new().is_balanced());
    }

    #[test]
    fn flat_object_balances() {
        let scanner = scan_all(r#"{"response": "Hola!", "currentWord": null}"#);
        assert!(scanner.is_balanced());
        assert_eq!(scanner.depth(), 0);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let scanner = scan_all(r#"{"response": "} { }}"#);
        assert_eq!(scanner.depth(), 1);
        assert!(!scanner.is_balanced());
    }

    #[test]
    fn escaped_quote_keeps_string_open() {
        let scanner = scan_all(r#"{"response": "say \"}"#);
        assert!(scanner.in_string());
        assert!(!scanner.is_balanced());
    }

    #[test]
    fn escaped_backslash_closes_string() {
        let scanner = scan_all(r#"{"response": "dir\\"}"#);
        assert!(!scanner.in_string());
        assert!(scanner.is_balanced());
    }

    #[test]
    fn nested_object_needs_both_closes() {
        let mut scanner = scan_all(r#"{"exercises": {"count": 3}"#);
        assert_eq!(scanner.depth(), 1);
        scanner.feed(b"}");
        assert!(scanner.is_balanced());
    }

    #[test]
    fn split_feed_matches_single_feed() {
        let text = r#"{"response": "a\\\"b\\", "x": {"y": "}"}}"#;
        let whole = scan_all(text);
        for split in 0..=text.len() {
            let mut scanner = StructuralScanner::new();
            scanner.feed(&text.as_bytes()[..split]);
            scanner.feed(&text.as_bytes()[split..]);
            assert_eq!(scanner, whole, "split at {split}");
        }
    }

    #[test]
    fn stray_close_goes_negative() {
        let scanner = scan_all("}");
        assert_eq!(scanner.depth(), -1);
        assert!(!scanner.is_balanced());
    }
}
