use tsp_types::ParsedObject;
use tsp_wire::frame::{Frame, FrameKind};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::event::DecoderEvent;

/// Incremental decoder for the length-prefixed frame stream.
///
/// Produces the same [`DecoderEvent`]s as [`StreamDecoder`](crate::StreamDecoder)
/// does for the legacy body, without inferring anything from brace
/// balance: each frame says what it is and how long it is.
///
/// ```text
/// ┌─────────┬────────────────────────────────────────────┐
/// │ Frame   │ Event                                      │
/// ├─────────┼────────────────────────────────────────────┤
/// │ Delta   │ Delta(text)                                │
/// │ Summary │ Complete(object)                           │
/// │ Error   │ Error(UpstreamGenerationError(message))    │
/// │ End     │ Error(UnterminatedValue) if nothing ended  │
/// └─────────┴────────────────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct FrameDecoder {
    config: DecoderConfig,
    pending: Vec<u8>,
    received: usize,
    finished: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            received: 0,
            finished: false,
        }
    }

    /// Consume framed bytes; frames may be split anywhere.
    pub fn consume(&mut self, bytes: &[u8]) -> Vec<DecoderEvent> {
        if self.finished {
            return Vec::new();
        }

        self.received += bytes.len();
        if self.received > self.config.max_len {
            return self.fail(DecodeError::ExceededMaxLength {
                len: self.received,
                limit: self.config.max_len,
            });
        }
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut used = 0;
        loop {
            let offset = self.received - self.pending.len() + used;
            let (frame, n) = match Frame::read_from(&self.pending[used..]) {
                Ok(Some(read)) => read,
                Ok(None) => break,
                Err(err) => {
                    events.extend(self.fail(err.into()));
                    return events;
                }
            };
            used += n;

            match self.frame_event(frame, offset) {
                Ok(Some(event)) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.terminate();
                        return events;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    events.extend(self.fail(err));
                    return events;
                }
            }
        }

        self.pending.drain(..used);
        events
    }

    /// Signal end of the byte stream.
    pub fn finish(&mut self) -> Vec<DecoderEvent> {
        if self.finished {
            return Vec::new();
        }
        let received = self.received;
        self.fail(DecodeError::UnterminatedValue { received })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `offset` is the stream position of the frame's first byte; it is
    /// reported as-is for a body that is not UTF-8.
    fn frame_event(&self, frame: Frame, offset: usize) -> Result<Option<DecoderEvent>, DecodeError> {
        let text = |body: Vec<u8>| {
            String::from_utf8(body).map_err(|_| DecodeError::InvalidUtf8 { offset })
        };

        match frame.kind {
            FrameKind::Delta if frame.body.is_empty() => Ok(None),
            FrameKind::Delta => Ok(Some(DecoderEvent::Delta(text(frame.body)?))),
            FrameKind::Summary => {
                let json = text(frame.body)?;
                ParsedObject::from_json(&json)
                    .map(|object| Some(DecoderEvent::Complete(object)))
                    .map_err(|err| DecodeError::InvalidFinalJson {
                        reason: err.to_string(),
                    })
            }
            FrameKind::Error => Ok(Some(DecoderEvent::Error(
                DecodeError::UpstreamGenerationError(text(frame.body)?),
            ))),
            FrameKind::End => Err(DecodeError::UnterminatedValue {
                received: self.received,
            }),
        }
    }

    fn fail(&mut self, error: DecodeError) -> Vec<DecoderEvent> {
        tracing::warn!(error = %error, "framed stream failed");
        self.terminate();
        vec![DecoderEvent::Error(error)]
    }

    fn terminate(&mut self) {
        self.finished = true;
        self.pending = Vec::new();
    }
}
