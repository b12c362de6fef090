use std::fmt::Display;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tsp_types::TurnMetadata;

use crate::encoder::ResponseEncoder;
use crate::error::EncodeError;

/// Pump a fragment source into an async sink as a legacy response body.
///
/// `source` yields text fragments from the generation service; it ends
/// with `None` on success or yields an `Err` on failure. Each fragment is
/// escaped, written, and flushed before the next one is polled, so the
/// consumer sees text with no batching delay. Backpressure comes from the
/// sink: a slow reader stalls the `write_all`, which stalls the poll.
///
/// ```text
///   source:  "Hel"      "lo, "     "cómo estás?"   <end>
///   sink:    {"response": "Hel | lo,  | cómo estás? | ", "currentCategory": ...}
///            └ flush ┘            └ flush ┘    └ flush ┘     └── flush ──┘
/// ```
///
/// On an upstream error the encoder still closes the value and writes the
/// trailing fields as `null` (so the consumer does not hang waiting for a
/// quote), flushes, and then returns [`EncodeError::Upstream`]. A sink
/// failure while writing that tail is logged; the upstream error is still
/// the one returned.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// - [`EncodeError::Upstream`] if `source` yields an error.
/// - [`EncodeError::Io`] if the sink fails.
/// - [`EncodeError::Type`] if `metadata` fails to serialize.
pub async fn encode_stream<S, E, W>(
    source: S,
    metadata: &TurnMetadata,
    sink: &mut W,
) -> Result<usize, EncodeError>
where
    S: Stream<Item = Result<String, E>>,
    E: Display,
    W: AsyncWrite + Unpin,
{
    let mut source = std::pin::pin!(source);
    let mut encoder = ResponseEncoder::new();
    let mut out = String::with_capacity(256);

    while let Some(item) = source.next().await {
        out.clear();
        match item {
            Ok(fragment) => {
                encoder.fragment(&fragment, &mut out)?;
                write_flushed(sink, &out).await?;
                tracing::trace!(
                    fragment_len = fragment.len(),
                    total = encoder.bytes_written(),
                    "fragment written"
                );
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "fragment source failed, closing object with nulls");
                encoder.abort(&mut out)?;
                if let Err(write_err) = write_flushed(sink, &out).await {
                    tracing::warn!(error = %write_err, "sink failed while closing the object");
                }
                return Err(EncodeError::Upstream(message));
            }
        }
    }

    out.clear();
    encoder.finish(metadata, &mut out)?;
    write_flushed(sink, &out).await?;
    tracing::debug!(
        fragments = encoder.fragments(),
        bytes = encoder.bytes_written(),
        "response object complete"
    );
    Ok(encoder.bytes_written())
}

async fn write_flushed<W: AsyncWrite + Unpin>(sink: &mut W, text: &str) -> Result<(), EncodeError> {
    sink.write_all(text.as_bytes()).await?;
    sink.flush().await?;
    Ok(())
}
