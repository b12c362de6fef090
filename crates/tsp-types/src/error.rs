/// Errors from converting between JSON text and the typed response model.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The text is not a JSON object of the expected shape.
    ///
    /// Covers syntax errors, a missing `response` key, wrong value types,
    /// and trailing non-whitespace after the object.
    #[error("invalid response object: {0}")]
    Json(#[from] serde_json::Error),
}
