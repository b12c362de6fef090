/// Implementation of `tsp decode`.
///
/// Streams a body through the decoder the way a chat client would: text
/// is written to stdout as each delta arrives, and once the object is
/// complete it is pretty-printed after a blank line.
///
/// ```text
/// $ tsp decode turn.json --chunk-size 8
/// Hola!
/// ¿Cómo estás?
///
/// {
///   "response": "Hola!\n¿Cómo estás?\n",
///   "currentCategory": null,
///   ...
/// }
/// ```
///
/// `--framed` reads a length-prefixed frame stream instead; the output is
/// identical.
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncRead, AsyncReadExt};
use tsp_decoder::{DecodeError, DecoderConfig, EventSink, FrameDecoder, StreamingDecoder};
use tsp_types::ParsedObject;

use crate::{DecodeArgs, block_on};

/// Writes deltas straight to stdout and keeps the terminal outcome.
struct TerminalSink {
    deltas: usize,
    outcome: Option<Result<ParsedObject, DecodeError>>,
}

impl EventSink for TerminalSink {
    fn on_delta(&mut self, text: &str) {
        self.deltas += 1;
        let mut stdout = std::io::stdout().lock();
        // A closed stdout surfaces again when the object is printed.
        let _ = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush());
    }

    fn on_complete(&mut self, object: ParsedObject) {
        self.outcome = Some(Ok(object));
    }

    fn on_error(&mut self, error: DecodeError) {
        self.outcome = Some(Err(error));
    }
}

/// Run the `tsp decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, or if the
/// stream ends in a decoder error.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let config = DecoderConfig::default()
        .with_max_len(args.max_len)
        .with_read_chunk_size(args.chunk_size);

    let sink = block_on(async {
        let reader = open(&args.file).await?;
        let mut sink = TerminalSink {
            deltas: 0,
            outcome: None,
        };
        if args.framed {
            drive_framed(reader, config, &mut sink).await?;
        } else {
            StreamingDecoder::with_config(reader, config).drive(&mut sink).await;
        }
        Ok::<_, anyhow::Error>(sink)
    })??;

    tracing::debug!(deltas = sink.deltas, "stream finished");

    match sink.outcome {
        Some(Ok(object)) => {
            let pretty = serde_json::to_string_pretty(&object).context("cannot render object")?;
            println!("\n\n{pretty}");
            Ok(())
        }
        Some(Err(err)) => {
            println!();
            Err(anyhow!(err).context("decoding failed"))
        }
        None => Err(anyhow!("decoder produced no terminal event")),
    }
}

async fn open(path: &Path) -> Result<Box<dyn AsyncRead + Unpin>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(file))
}

async fn drive_framed<R, S>(mut reader: R, config: DecoderConfig, sink: &mut S) -> Result<()>
where
    R: AsyncRead + Unpin,
    S: EventSink,
{
    let mut decoder = FrameDecoder::with_config(config);
    let mut buf = vec![0; config.read_chunk_size];

    while !decoder.is_finished() {
        let n = reader.read(&mut buf).await.context("read failed")?;
        let events = if n == 0 {
            decoder.finish()
        } else {
            decoder.consume(&buf[..n])
        };
        for event in events {
            event.dispatch(sink);
        }
    }
    Ok(())
}
