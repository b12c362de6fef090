#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tsp_decoder::{DecoderConfig, DecoderEvent, StreamDecoder};

// Fuzz target: StreamDecoder over arbitrary text in arbitrary chunks.
//
// Catches bugs in:
// - Marker search resuming at the wrong offset
// - Escape handling that slices inside a multi-byte character
// - More than one terminal event, or events after a terminal event
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    chunks: Vec<String>,
    max_len: u16,
}

fuzz_target!(|input: FuzzInput| {
    let config = DecoderConfig::default().with_max_len(usize::from(input.max_len).max(1));
    let mut decoder = StreamDecoder::with_config(config);
    let mut terminals = 0;

    for chunk in &input.chunks {
        let events = decoder.consume(chunk);
        assert!(events.iter().filter(|e| matches!(e, DecoderEvent::Delta(_))).count() <= 1);
        terminals += events.iter().filter(|e| e.is_terminal()).count();
    }
    terminals += decoder.finish().iter().filter(|e| e.is_terminal()).count();

    assert_eq!(terminals, 1);
    assert!(decoder.finish().is_empty());
});
