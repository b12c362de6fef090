//! Shared fixtures for the TSP integration tests, benches, and the golden
//! file generator.
//!
//! Each [`GoldenCase`] pairs the fragments and metadata a producer is given
//! with the body file committed under `tests/golden/<name>/body.json`. The
//! conformance suite checks both directions: encoding the case must
//! reproduce the file byte for byte, and decoding the file must yield the
//! case's text and metadata.

use std::path::PathBuf;

use tsp_types::{Exercise, ExerciseSet, TurnMetadata};

/// One committed wire fixture.
#[derive(Clone, Debug)]
pub struct GoldenCase {
    pub name: &'static str,
    pub fragments: Vec<&'static str>,
    pub metadata: TurnMetadata,
}

impl GoldenCase {
    /// The text a consumer should end up showing.
    #[must_use]
    pub fn response(&self) -> String {
        self.fragments.concat()
    }

    #[must_use]
    pub fn body_path(&self) -> PathBuf {
        golden_dir().join(self.name).join("body.json")
    }
}

/// `tests/golden/` inside this crate.
#[must_use]
pub fn golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/golden")
}

/// Every encoder-generated fixture.
#[must_use]
pub fn golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            name: "greeting",
            fragments: vec!["Hola! ", "¿Cómo estás?"],
            metadata: TurnMetadata::new()
                .with_word("casa")
                .with_word_progress("pronunciation"),
        },
        GoldenCase {
            name: "escapes",
            fragments: vec!["She said \"hola\".\n", "Path: C:\\tmp\\x\t", "bell\u{7}"],
            metadata: TurnMetadata::new().with_category("greetings"),
        },
        GoldenCase {
            name: "exercises",
            fragments: vec!["¡Muy bien! ", "Now try these."],
            metadata: TurnMetadata::new()
                .with_category("food")
                .with_word("manzana")
                .with_word_progress("complete")
                .with_exercises(sample_exercises()),
        },
        GoldenCase {
            name: "empty",
            fragments: Vec::new(),
            metadata: TurnMetadata::new(),
        },
    ]
}

#[must_use]
pub fn sample_exercises() -> ExerciseSet {
    let exercise = |unscrambled: &str, scrambled: &str| Exercise {
        unscrambled: unscrambled.to_owned(),
        scrambled: scrambled.to_owned(),
    };
    ExerciseSet {
        basic: exercise("Yo como una manzana", "manzana una como Yo"),
        intermediate: exercise(
            "Me gusta comer manzanas rojas",
            "rojas comer Me manzanas gusta",
        ),
        advanced: exercise(
            "Ayer compré manzanas en el mercado",
            "mercado compré el Ayer en manzanas",
        ),
        count: 3,
    }
}

/// A long tutor reply split into word-sized fragments, with enough quotes,
/// newlines, and non-ASCII text to exercise every escape path.
#[must_use]
pub fn long_reply(words: usize) -> Vec<String> {
    const WORDS: [&str; 8] = [
        "Muy ", "bien, ", "\"casa\" ", "means ", "house.\n", "Try: ", "¿dónde ", "está? 🏠 ",
    ];
    WORDS.iter().cycle().take(words).map(|w| (*w).to_owned()).collect()
}

/// Cut `text` into chunks whose character lengths come from `splits`
/// (each taken modulo what remains, plus one). Whatever is left after the
/// last split becomes the final chunk.
#[must_use]
pub fn partition(text: &str, splits: &[usize]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut idx = 0;

    for &s in splits {
        let remaining = chars.len() - idx;
        if remaining == 0 {
            break;
        }
        let size = 1 + (s % remaining);
        chunks.push(chars[idx..idx + size].iter().collect());
        idx += size;
    }
    if idx < chars.len() {
        chunks.push(chars[idx..].iter().collect());
    }
    chunks
}

/// Split `text` at byte offset `at`, rounded down to a character boundary.
#[must_use]
pub fn split_at_byte(text: &str, at: usize) -> (&str, &str) {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    text.split_at(at)
}
