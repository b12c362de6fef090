#![no_main]

use libfuzzer_sys::fuzz_target;
use tsp_decoder::FrameDecoder;

// Fuzz target: FrameDecoder over arbitrary bytes, split in two.
//
// Catches bugs in:
// - Varint overflow in frame lengths
// - Truncated frames
// - Oversized body lengths
// - Non-UTF-8 frame bodies
fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());

    let mut decoder = FrameDecoder::new();
    let mut terminals = 0;
    for piece in [&rest[..at], &rest[at..]] {
        terminals += decoder.consume(piece).iter().filter(|e| e.is_terminal()).count();
    }
    terminals += decoder.finish().iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1);
});
