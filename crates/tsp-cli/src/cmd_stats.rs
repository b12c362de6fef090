/// Implementation of `tsp stats`.
///
/// Decodes a body as if it arrived in `--chunk-size` pieces and prints a
/// summary of how the text was delivered.
///
/// ```text
/// Body:            312 bytes in 5 chunks of 64
/// Response:        241 bytes (198 chars)
/// Deltas:          4 (avg 49.5 chars)
/// Escape overhead: 9 bytes
/// Metadata:        word, progress, exercises
/// ```
use std::fs;

use anyhow::{Context, Result};
use tsp_decoder::{DecoderConfig, decode_chunks};
use tsp_types::ParsedObject;

use crate::{StatsArgs, chunk_str};

/// Run the `tsp stats` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to decode.
pub fn run(args: &StatsArgs) -> Result<()> {
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let chunks = chunk_str(&body, args.chunk_size);
    let chunk_count = chunks.len();
    let decoded = decode_chunks(chunks, DecoderConfig::default().with_max_len(body.len().max(1)))
        .context("decoding failed")?;

    let response = &decoded.object.response;
    let chars = response.chars().count();
    let escaped = tsp_wire::escape(response).len();

    println!(
        "Body:            {} bytes in {chunk_count} chunks of {}",
        body.len(),
        args.chunk_size
    );
    println!("Response:        {} bytes ({chars} chars)", response.len());
    println!(
        "Deltas:          {} (avg {:.1} chars)",
        decoded.deltas.len(),
        average(chars, decoded.deltas.len())
    );
    println!("Escape overhead: {} bytes", escaped - response.len());
    println!("Metadata:        {}", present_fields(&decoded.object));
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn average(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn present_fields(object: &ParsedObject) -> String {
    let fields: Vec<&str> = [
        ("category", object.current_category.is_some()),
        ("word", object.current_word.is_some()),
        ("progress", object.current_word_progress.is_some()),
        ("exercises", object.exercises.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, present)| present.then_some(name))
    .collect();

    if fields.is_empty() {
        "none".to_owned()
    } else {
        fields.join(", ")
    }
}
