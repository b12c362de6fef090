use tsp_wire::WireError;

/// Errors that terminate a decoded stream.
///
/// Every variant is fatal for the stream it occurs on: the decoder never
/// retries and never skips ahead. Retrying the whole request, and any
/// user-visible fallback text, is the caller's decision.
///
/// ```text
///   DecodeError
///   ├── TransportMissing         ← no body to read at all
///   ├── UnterminatedValue        ← transport ended inside `response`
///   ├── ExceededMaxLength        ← buffer grew past the ceiling
///   ├── InvalidFinalJson         ← balanced but unparseable at end-of-stream
///   ├── UpstreamGenerationError  ← the producer reported a failure
///   ├── InvalidUtf8              ← transport bytes are not UTF-8
///   ├── Wire(WireError)          ← malformed frame (framed streams only)
///   └── Io(std::io::Error)       ← transport read failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no response body available")]
    TransportMissing,

    /// The transport ended before the `response` value's closing quote.
    /// Also raised when the value never started.
    #[error("stream ended inside the response value after {received} bytes")]
    UnterminatedValue { received: usize },

    #[error("response body exceeded {limit} bytes (received {len})")]
    ExceededMaxLength { len: usize, limit: usize },

    /// The buffer looked like a complete object but did not parse, and no
    /// more input is coming.
    #[error("final response object is not valid JSON: {reason}")]
    InvalidFinalJson { reason: String },

    /// The generation service failed; carried through unchanged.
    #[error("upstream generation failed: {0}")]
    UpstreamGenerationError(String),

    #[error("invalid UTF-8 in response body at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Field-free classification of a [`DecodeError`], for consumers that
/// only branch on the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TransportMissing,
    UnterminatedValue,
    ExceededMaxLength,
    InvalidFinalJson,
    UpstreamGenerationError,
    InvalidUtf8,
    Wire,
    Io,
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransportMissing => ErrorKind::TransportMissing,
            Self::UnterminatedValue { .. } => ErrorKind::UnterminatedValue,
            Self::ExceededMaxLength { .. } => ErrorKind::ExceededMaxLength,
            Self::InvalidFinalJson { .. } => ErrorKind::InvalidFinalJson,
            Self::UpstreamGenerationError(_) => ErrorKind::UpstreamGenerationError,
            Self::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Self::Wire(_) => ErrorKind::Wire,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
