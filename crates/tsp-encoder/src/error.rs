use tsp_types::TypeError;
use tsp_wire::WireError;

/// Errors that can occur while producing a response body.
///
/// ```text
///   EncodeError
///   ├── Upstream(String)   ← the fragment source failed mid-stream
///   ├── AlreadyFinished    ← write after the object was closed
///   ├── Type(TypeError)    ← trailing field or summary failed to serialize
///   ├── Wire(WireError)    ← malformed frame in the framed bridge
///   └── Io(std::io::Error) ← from the output sink
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The fragment source reported an error before completion.
    ///
    /// By the time this is returned the encoder has already closed the
    /// value and written the trailing fields as `null`, so the consumer
    /// sees a parseable object rather than a hanging string.
    #[error("upstream generation failed: {0}")]
    Upstream(String),

    #[error("the response object has already been closed")]
    AlreadyFinished,

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Type(TypeError::Json(err))
    }
}
