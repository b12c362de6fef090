//! The length-prefixed alternative to the legacy body, plus the bridge
//! that turns it back into legacy bytes at the outer boundary.
//!
//! ```text
//!   generation ──▶ encode_framed ──▶ [Delta]*[Summary][End] ──▶ LegacyBridge ──▶ {"response": ...}
//!                                    (internal hop, explicit     (browser-facing body,
//!                                     lengths, no brace games)    unchanged wire format)
//! ```
use std::fmt::Display;

use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tsp_types::{ParsedObject, TurnMetadata};
use tsp_wire::WireError;
use tsp_wire::frame::{Frame, FrameKind};

use crate::encoder::ResponseEncoder;
use crate::error::EncodeError;

/// Pump a fragment source into `sink` as frames.
///
/// Every fragment becomes one `Delta` frame, flushed immediately. On
/// success a `Summary` frame with the complete object follows; on an
/// upstream error an `Error` frame does. Either way the stream ends with
/// an `End` frame.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// - [`EncodeError::Upstream`] if `source` yields an error (after the
///   `Error` and `End` frames have been written).
/// - [`EncodeError::Io`] if the sink fails.
pub async fn encode_framed<S, E, W>(
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
    let mut response = String::new();
    let mut buf = Vec::with_capacity(256);
    let mut written = 0;

    while let Some(item) = source.next().await {
        buf.clear();
        match item {
            Ok(fragment) => {
                Frame::delta(&fragment).write_to(&mut buf);
                response.push_str(&fragment);
                written += write_flushed(sink, &buf).await?;
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "fragment source failed, ending framed stream");
                Frame::error(&message).write_to(&mut buf);
                Frame::end().write_to(&mut buf);
                if let Err(write_err) = write_flushed(sink, &buf).await {
                    tracing::warn!(error = %write_err, "sink failed while ending framed stream");
                }
                return Err(EncodeError::Upstream(message));
            }
        }
    }

    let summary = ParsedObject::new(response, metadata.clone()).to_json()?;
    buf.clear();
    Frame::summary(&summary).write_to(&mut buf);
    Frame::end().write_to(&mut buf);
    written += write_flushed(sink, &buf).await?;
    Ok(written)
}

async fn write_flushed<W: AsyncWrite + Unpin>(sink: &mut W, bytes: &[u8]) -> Result<usize, EncodeError> {
    sink.write_all(bytes).await?;
    sink.flush().await?;
    Ok(bytes.len())
}

/// Re-emits a framed stream as the legacy response body.
///
/// Feed it raw framed bytes in whatever pieces they arrive; it returns the
/// legacy bytes that can be written so far.
///
/// ```text
/// ┌─────────┬──────────────────────────────────────────────────────┐
/// │ Frame   │ Legacy output                                        │
/// ├─────────┼──────────────────────────────────────────────────────┤
/// │ Delta   │ escaped text appended to the open `response` value   │
/// │ Summary │ closing quote + trailing fields from the summary     │
/// │ Error   │ closing quote + trailing fields as `null`            │
/// │ End     │ nothing; any later bytes are rejected                │
/// └─────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// The summary's `response` is not re-sent: the deltas already carried it.
#[derive(Debug, Default)]
pub struct LegacyBridge {
    pending: Vec<u8>,
    encoder: ResponseEncoder,
    ended: bool,
    consumed: usize,
}

impl LegacyBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume framed bytes, appending legacy output to `out`.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::Wire`] for a malformed frame.
    /// - [`EncodeError::Type`] if a summary is not a valid response object.
    /// - [`EncodeError::Io`] (`InvalidData`) if a frame body is not UTF-8.
    /// - [`EncodeError::AlreadyFinished`] for content frames after the
    ///   object was closed.
    /// - [`EncodeError::Wire`] (`FrameAfterEnd`) for any bytes after the
    ///   `End` frame. Nothing from them reaches `out`.
    pub fn push(&mut self, bytes: &[u8], out: &mut String) -> Result<(), EncodeError> {
        if self.ended {
            if bytes.is_empty() {
                return Ok(());
            }
            return Err(WireError::FrameAfterEnd { offset: self.consumed }.into());
        }

        self.pending.extend_from_slice(bytes);
        let mut used = 0;

        while !self.ended {
            let Some((frame, n)) = Frame::read_from(&self.pending[used..])? else {
                break;
            };
            used += n;
            match frame.kind {
                FrameKind::Delta => {
                    let text = std::str::from_utf8(&frame.body)
                        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                    self.encoder.fragment(text, out)?;
                }
                FrameKind::Summary => {
                    let text = std::str::from_utf8(&frame.body)
                        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                    let summary = ParsedObject::from_json(text)?;
                    self.encoder.finish(&summary.metadata(), out)?;
                }
                FrameKind::Error => self.encoder.abort(out)?,
                FrameKind::End => {
                    self.ended = true;
                    // Close the value if the producer ended without a summary.
                    if !self.encoder.is_finished() {
                        self.encoder.abort(out)?;
                    }
                }
            }
        }

        self.pending.drain(..used);
        self.consumed += used;
        if self.ended && !self.pending.is_empty() {
            tracing::debug!(trailing = self.pending.len(), "bytes after end frame");
            self.pending.clear();
            return Err(WireError::FrameAfterEnd { offset: self.consumed }.into());
        }
        Ok(())
    }

    /// Whether the `End` frame has been seen.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn framed(fragments: &[&str], fail: bool, meta: &TurnMetadata) -> Vec<u8> {
        let mut items: Vec<Result<String, &str>> =
            fragments.iter().map(|s| Ok((*s).to_string())).collect();
        if fail {
            items.push(Err("boom"));
        }
        let mut sink = Vec::new();
        let _ = encode_framed(stream::iter(items), meta, &mut sink).await;
        sink
    }

    #[tokio::test]
    async fn frames_in_order() {
        let bytes = framed(&["Hel", "lo"], false, &TurnMetadata::new()).await;
        let mut kinds = Vec::new();
        let mut rest = bytes.as_slice();
        while let Some((frame, n)) = Frame::read_from(rest).unwrap() {
            kinds.push(frame.kind);
            rest = &rest[n..];
        }
        assert!(rest.is_empty());
        assert_eq!(
            kinds,
            [FrameKind::Delta, FrameKind::Delta, FrameKind::Summary, FrameKind::End]
        );
    }

    #[tokio::test]
    async fn upstream_error_becomes_error_frame() {
        let mut sink = Vec::new();
        let source = stream::iter(vec![Ok("a".to_string()), Err("boom")]);
        let err = encode_framed(source, &TurnMetadata::new(), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::Upstream(_)));
        assert!(sink.ends_with(&[0x03, 0x04, b'b', b'o', b'o', b'm', 0xFF, 0x00]));
    }

    #[tokio::test]
    async fn bridge_matches_direct_encoding_byte_for_byte() {
        let meta = TurnMetadata::new().with_word("hola").with_category("saludos");
        let fragments = ["¡Hola", "! \"Qué\"", " tal?\n"];
        let bytes = framed(&fragments, false, &meta).await;

        // Feed one byte at a time to exercise partial frames.
        let mut bridge = LegacyBridge::new();
        let mut legacy = String::new();
        for byte in &bytes {
            bridge.push(std::slice::from_ref(byte), &mut legacy).unwrap();
        }

        assert!(bridge.is_ended());
        assert_eq!(legacy, crate::encode_to_string(&fragments, &meta).unwrap());
    }

    #[tokio::test]
    async fn bridge_rejects_frames_after_end() {
        let bytes = framed(&["hola"], false, &TurnMetadata::new()).await;
        let mut bridge = LegacyBridge::new();
        let mut legacy = String::new();
        bridge.push(&bytes, &mut legacy).unwrap();
        let closed = legacy.clone();

        let mut late = Vec::new();
        Frame::delta("otra vez").write_to(&mut late);
        let err = bridge.push(&late, &mut legacy).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Wire(WireError::FrameAfterEnd { offset }) if offset == bytes.len()
        ));
        assert_eq!(legacy, closed);
        assert!(bridge.push(&[], &mut legacy).is_ok());
    }

    #[tokio::test]
    async fn bridge_rejects_trailing_bytes_in_the_same_push() {
        let mut bytes = framed(&["hola"], false, &TurnMetadata::new()).await;
        let end = bytes.len();
        Frame::delta("otra vez").write_to(&mut bytes);

        let mut bridge = LegacyBridge::new();
        let mut legacy = String::new();
        let err = bridge.push(&bytes, &mut legacy).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Wire(WireError::FrameAfterEnd { offset }) if offset == end
        ));
        assert!(bridge.is_ended());
        assert!(ParsedObject::from_json(&legacy).is_ok());
    }

    #[tokio::test]
    async fn bridge_closes_with_nulls_on_error_frame() {
        let meta = TurnMetadata::new().with_word("never sent");
        let bytes = framed(&["parcial"], true, &meta).await;
        let mut bridge = LegacyBridge::new();
        let mut legacy = String::new();
        bridge.push(&bytes, &mut legacy).unwrap();
        let parsed = ParsedObject::from_json(&legacy).unwrap();
        assert_eq!(parsed, ParsedObject::new("parcial", TurnMetadata::new()));
    }
}
