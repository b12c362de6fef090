//! Byte-exact literals of the legacy response body.
//!
//! The body is a single flat JSON object whose keys always appear in this
//! order, with one space after each colon and after each comma:
//!
//! ```text
//! {"response": "<streamed>", "currentCategory": <v>, "currentWord": <v>,
//!  "currentWordProgress": <v>, "exercises": <v>}
//! ```
//!
//! Only `response` is written incrementally. The decoder locates it by
//! searching for [`RESPONSE_MARKER`], which assumes no earlier bytes contain
//! that substring. `response` is always the first key, so nothing precedes it
//! today; a protocol revision that adds a string field in front of it would
//! need a different detection rule.

/// The literal that precedes the first byte of the streamed value.
pub const RESPONSE_MARKER: &str = "\"response\": \"";

/// Everything the producer writes before the first fragment.
pub const OPENING: &str = "{\"response\": \"";

/// Closes the streamed string value.
pub const VALUE_TERMINATOR: char = '"';

/// Closes the object.
pub const OBJECT_CLOSE: char = '}';

/// JSON literal written for absent trailing fields.
pub const NULL: &str = "null";

/// Trailing keys, in wire order, written after the streamed value closes.
pub const TRAILING_KEYS: [&str; 4] = [
    "currentCategory",
    "currentWord",
    "currentWordProgress",
    "exercises",
];

/// Append `, "<key>": <json_value>` to `out`.
pub fn push_trailing_field(out: &mut String, key: &str, json_value: &str) {
    out.push_str(", \"");
    out.push_str(key);
    out.push_str("\": ");
    out.push_str(json_value);
}
