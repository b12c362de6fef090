/// Implementation of `tsp validate`.
///
/// Decodes a whole body in one pass and reports a series of `✓` checks,
/// or a single `✗` diagnostic naming what went wrong.
///
/// # Success output
///
/// ```text
/// ✓ Marker: response value located
/// ✓ Value: 42 characters streamed in 1 delta
/// ✓ Object: parsed (word: casa, progress: pronunciation, exercises: 3 levels)
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: unterminated value — stream ended inside the response value after 31 bytes
/// ```
///
/// A body can parse and still disagree with what a streaming client saw,
/// e.g. when the producer omitted the space after the colon and the
/// marker never matched. That case is reported as a `✗ Mismatch`.
use std::fs;

use anyhow::{Context, Result, anyhow};
use tsp_decoder::{DecodeError, DecoderConfig, decode_complete};
use tsp_types::ParsedObject;

use crate::ValidateArgs;

/// Run the `tsp validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if the body fails to
/// decode or its streamed text disagrees with the final object.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let config = DecoderConfig::default().with_max_len(args.max_len);

    match decode_complete(&body, config) {
        Ok(decoded) => {
            let streamed = decoded.streamed_text();
            if streamed != decoded.object.response {
                println!(
                    "✗ Mismatch: clients would see {} characters, the object holds {}",
                    streamed.chars().count(),
                    decoded.object.response.chars().count()
                );
                return Err(anyhow!("validation failed"));
            }
            println!("✓ Marker: response value located");
            println!(
                "✓ Value: {} characters streamed in {} delta{}",
                streamed.chars().count(),
                decoded.deltas.len(),
                if decoded.deltas.len() == 1 { "" } else { "s" }
            );
            println!("✓ Object: parsed ({})", describe_metadata(&decoded.object));
            Ok(())
        }
        Err(e) => {
            println!("✗ Error: {}", decode_error_diagnostic(&e));
            Err(anyhow!("validation failed"))
        }
    }
}

fn describe_metadata(object: &ParsedObject) -> String {
    let mut parts = Vec::new();
    if let Some(category) = &object.current_category {
        parts.push(format!("category: {category}"));
    }
    if let Some(word) = &object.current_word {
        parts.push(format!("word: {word}"));
    }
    if let Some(progress) = &object.current_word_progress {
        parts.push(format!("progress: {progress}"));
    }
    if let Some(exercises) = &object.exercises {
        parts.push(format!("exercises: {} levels", exercises.levels().count()));
    }
    if parts.is_empty() {
        "no metadata".to_owned()
    } else {
        parts.join(", ")
    }
}

fn decode_error_diagnostic(e: &DecodeError) -> String {
    let label = match e {
        DecodeError::TransportMissing => "missing body",
        DecodeError::UnterminatedValue { .. } => "unterminated value",
        DecodeError::ExceededMaxLength { .. } => "too large",
        DecodeError::InvalidFinalJson { .. } => "invalid object",
        DecodeError::UpstreamGenerationError(_) => "upstream failure",
        DecodeError::InvalidUtf8 { .. } => "invalid encoding",
        DecodeError::Wire(_) => "malformed frame",
        DecodeError::Io(_) => "I/O error",
    };
    format!("{label} — {e}")
}
