/// Errors raised by the wire layer.
///
/// The legacy JSON body has no failure modes of its own at this level
/// (escaping is total and the structural scanner never rejects input), so
/// every variant here belongs to the length-prefixed frame format.
///
/// ```text
///   WireError
///   ├── VarintTooLong      ← length prefix ran past 10 bytes
///   ├── UnknownFrameKind   ← kind byte is not Delta/Summary/Error/End
///   ├── FrameTooLarge      ← declared body length exceeds the limit
///   ├── FrameAfterEnd      ← bytes followed the End frame
///   └── Io(std::io::Error) ← from underlying writes
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Varint encoding exceeded 10 bytes without terminating.
    #[error("varint too long: exceeded 10-byte limit")]
    VarintTooLong,

    /// The frame kind byte is not one this version understands.
    #[error("unknown frame kind {kind:#04X} at offset {offset}")]
    UnknownFrameKind { kind: u8, offset: usize },

    /// A frame declared a body larger than [`MAX_FRAME_BODY`](crate::frame::MAX_FRAME_BODY).
    #[error("frame body too large: {size} bytes (limit {limit})")]
    FrameTooLarge { size: u64, limit: usize },

    /// Input continued past the `End` frame that closes a stream.
    #[error("data after end frame at offset {offset}")]
    FrameAfterEnd { offset: usize },

    /// I/O error during write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
