/// Implementation of `tsp replay`.
///
/// Feeds a body to the decoder in fixed-size chunks and prints the events
/// each chunk produced. Useful for seeing where a chunk boundary landed
/// relative to the marker, an escape, or the closing quote.
///
/// ```text
/// $ tsp replay turn.json --chunk-size 16
/// [chunk 0] "{\"response\": \"Ho"  in-value
///   delta     "Ho"
/// [chunk 1] "la!\", \"currentCa"  value-closed
///   delta     "la!"
/// ...
/// [chunk 7] "ses\": null}"  value-closed
///   complete  response="Hola!" word=Some("casa")
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use tsp_decoder::{DecoderEvent, ParserState, StreamDecoder};

use crate::{ReplayArgs, chunk_str};

/// Run the `tsp replay` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the stream ends in a
/// decoder error.
pub fn run(args: &ReplayArgs) -> Result<()> {
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let mut decoder = StreamDecoder::new();
    let mut failed = false;

    for (index, chunk) in chunk_str(&body, args.chunk_size).into_iter().enumerate() {
        let events = decoder.consume(chunk);
        println!("[chunk {index}] {chunk:?}  {}", state_label(decoder.state()));
        failed |= print_events(events);
        if decoder.is_finished() {
            break;
        }
    }

    let events = decoder.finish();
    if !events.is_empty() {
        println!("[eof]");
        failed |= print_events(events);
    }

    if failed {
        Err(anyhow!("stream ended in an error"))
    } else {
        Ok(())
    }
}

fn state_label(state: ParserState) -> &'static str {
    match state {
        ParserState::SeekingKey => "seeking-key",
        ParserState::InValue => "in-value",
        ParserState::ValueClosed => "value-closed",
    }
}

/// Returns `true` if one of the events was an error.
fn print_events(events: Vec<DecoderEvent>) -> bool {
    let mut failed = false;
    for event in events {
        match event {
            DecoderEvent::Delta(text) => println!("  delta     {text:?}"),
            DecoderEvent::Complete(object) => println!(
                "  complete  response={:?} word={:?}",
                object.response, object.current_word
            ),
            DecoderEvent::Error(err) => {
                println!("  error     {err}");
                failed = true;
            }
        }
    }
    failed
}
