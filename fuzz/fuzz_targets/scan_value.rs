#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: scan_value on arbitrary raw value text.
//
// The consumed count must land on a character boundary, and rescanning
// the unconsumed tail must never lose or duplicate a closing quote.
fuzz_target!(|raw: &str| {
    let scan = tsp_wire::scan_value(raw);
    assert!(raw.is_char_boundary(scan.consumed));
    if scan.closed {
        assert_eq!(raw.as_bytes()[scan.consumed], b'"');
    }
});
