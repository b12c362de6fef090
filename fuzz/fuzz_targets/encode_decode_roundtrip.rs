#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tsp_decoder::{DecoderConfig, decode_chunks};
use tsp_encoder::encode_to_string;
use tsp_types::TurnMetadata;

// Fuzz target: encode arbitrary fragments, decode at arbitrary splits.
//
// The streamed text and the final object must both equal the input.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    fragments: Vec<String>,
    category: Option<String>,
    word: Option<String>,
    progress: Option<String>,
    splits: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let metadata = TurnMetadata {
        current_category: input.category,
        current_word: input.word,
        current_word_progress: input.progress,
        exercises: None,
    };
    let body = encode_to_string(&input.fragments, &metadata).unwrap();

    let mut chunks = Vec::new();
    let mut rest = body.as_str();
    for split in input.splits {
        if rest.is_empty() {
            break;
        }
        let mut at = usize::from(split).min(rest.len());
        while !rest.is_char_boundary(at) {
            at -= 1;
        }
        let (head, tail) = rest.split_at(at);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);

    let config = DecoderConfig::default().with_max_len(body.len());
    let decoded = decode_chunks(chunks, config).unwrap();
    let expected = input.fragments.concat();
    assert_eq!(decoded.streamed_text(), expected);
    assert_eq!(decoded.object.response, expected);
    assert_eq!(decoded.object.metadata(), metadata);
});
