use crate::error::WireError;
use crate::varint::{put_varint, take_varint};

/// Largest body a single frame may declare (16 MiB).
pub const MAX_FRAME_BODY: usize = 16 * 1024 * 1024;

/// Record types of the length-prefixed stream.
///
/// ```text
/// ┌──────┬─────────┬──────────────────────────────────────────┐
/// │ Byte │ Kind    │ Body                                     │
/// ├──────┼─────────┼──────────────────────────────────────────┤
/// │ 0x01 │ Delta   │ UTF-8 text appended to the response      │
/// │ 0x02 │ Summary │ the complete response object as JSON     │
/// │ 0x03 │ Error   │ UTF-8 message from the generation side   │
/// │ 0xFF │ End     │ empty                                    │
/// └──────┴─────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Delta,
    Summary,
    Error,
    End,
}

impl FrameKind {
    #[must_use]
    pub fn wire_id(self) -> u8 {
        match self {
            Self::Delta => 0x01,
            Self::Summary => 0x02,
            Self::Error => 0x03,
            Self::End => 0xFF,
        }
    }

    #[must_use]
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            0x01 => Some(Self::Delta),
            0x02 => Some(Self::Summary),
            0x03 => Some(Self::Error),
            0xFF => Some(Self::End),
            _ => None,
        }
    }
}

/// One record of the length-prefixed alternative to the legacy body.
///
/// The legacy body infers completion from brace balance. Internal hops
/// that do not need to speak it can carry these frames instead, where
/// every record announces its own length and the end is explicit.
///
/// ```text
/// ┌───────────────────────────────────────┐
/// │ kind   (uint8)                        │
/// │ len    (varint)                       │
/// │ body   [len bytes]                    │
/// └───────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub body: Vec<u8>,
}

impl Frame {
    #[must_use]
    pub fn delta(text: &str) -> Self {
        Self {
            kind: FrameKind::Delta,
            body: text.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn summary(json: &str) -> Self {
        Self {
            kind: FrameKind::Summary,
            body: json.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            kind: FrameKind::Error,
            body: message.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn end() -> Self {
        Self {
            kind: FrameKind::End,
            body: Vec::new(),
        }
    }

    /// Append this frame's wire bytes to `out`, returning the count written.
    pub fn write_to(&self, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        out.push(self.kind.wire_id());
        put_varint(self.body.len() as u64, out);
        out.extend_from_slice(&self.body);
        out.len() - start
    }

    /// Serialize into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 4);
        self.write_to(&mut out);
        out
    }

    /// Read one frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` if `buf` holds only part of a frame.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnknownFrameKind`] for an unrecognised kind byte.
    /// - [`WireError::FrameTooLarge`] if the declared length exceeds
    ///   [`MAX_FRAME_BODY`].
    /// - [`WireError::VarintTooLong`] for a malformed length prefix.
    pub fn read_from(buf: &[u8]) -> Result<Option<(Self, usize)>, WireError> {
        let Some(&kind_byte) = buf.first() else {
            return Ok(None);
        };
        let kind = FrameKind::from_wire_id(kind_byte).ok_or(WireError::UnknownFrameKind {
            kind: kind_byte,
            offset: 0,
        })?;

        let Some((len, n)) = take_varint(&buf[1..])? else {
            return Ok(None);
        };
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= MAX_FRAME_BODY)
            .ok_or(WireError::FrameTooLarge {
                size: len,
                limit: MAX_FRAME_BODY,
            })?;

        let body_start = 1 + n;
        let body_end = body_start + len;
        if buf.len() < body_end {
            return Ok(None);
        }

        Ok(Some((
            Self {
                kind,
                body: buf[body_start..body_end].to_vec(),
            },
            body_end,
        )))
    }
}
