/// Implementation of `tsp encode`.
///
/// Reads fragment text, builds a [`TurnMetadata`] from the flags, and
/// pumps the fragments through the same async encoder the service uses.
///
/// ```text
/// $ printf 'Hola!\n¿Cómo estás?\n' > turn.txt
/// $ tsp encode turn.txt --word casa --progress pronunciation
/// {"response": "Hola!\n¿Cómo estás?\n", "currentCategory": null, "currentWord": "casa", ...}
/// ```
use std::convert::Infallible;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWrite;
use tsp_encoder::{encode_framed, encode_stream};
use tsp_types::{ExerciseSet, TurnMetadata};

use crate::{EncodeArgs, block_on};

/// Run the `tsp encode` command.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, the exercises file is
/// not a valid exercise set, or the output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let fragments = split_fragments(&text, args.chars);
    let metadata = build_metadata(args)?;

    tracing::debug!(fragments = fragments.len(), framed = args.framed, "encoding");

    let written = block_on(async {
        let mut sink: Box<dyn AsyncWrite + Unpin> = match &args.output {
            Some(path) => Box::new(
                tokio::fs::File::create(path)
                    .await
                    .with_context(|| format!("cannot create {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdout()),
        };
        let source = futures::stream::iter(fragments.into_iter().map(Ok::<_, Infallible>));
        let written = if args.framed {
            encode_framed(source, &metadata, &mut sink).await
        } else {
            encode_stream(source, &metadata, &mut sink).await
        };
        written.context("encoding failed")
    })??;

    if let Some(path) = &args.output {
        eprintln!("wrote {written} bytes to {}", path.display());
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// One fragment per line (newline kept), or fixed-width character runs.
fn split_fragments(text: &str, chars: Option<usize>) -> Vec<String> {
    match chars {
        Some(n) => {
            let n = n.max(1);
            let all: Vec<char> = text.chars().collect();
            all.chunks(n).map(|c| c.iter().collect()).collect()
        }
        None => text.split_inclusive('\n').map(str::to_owned).collect(),
    }
}

fn build_metadata(args: &EncodeArgs) -> Result<TurnMetadata> {
    let mut metadata = TurnMetadata::new();
    if let Some(category) = &args.category {
        metadata = metadata.with_category(category);
    }
    if let Some(word) = &args.word {
        metadata = metadata.with_word(word);
    }
    if let Some(progress) = &args.progress {
        metadata = metadata.with_word_progress(progress);
    }
    if let Some(path) = &args.exercises {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let set: ExerciseSet = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a valid exercise set", path.display()))?;
        metadata = metadata.with_exercises(set);
    }
    Ok(metadata)
}
