use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::exercise::ExerciseSet;
use crate::metadata::TurnMetadata;

/// The fully parsed response object, produced once the whole body has
/// arrived and passed a structural parse.
///
/// Field order matches the wire order, so serializing a `ParsedObject`
/// with `serde_json` yields the same key sequence the producer writes.
/// Only `response` is required; the other keys default to `None` when
/// absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedObject {
    pub response: String,
    #[serde(default)]
    pub current_category: Option<String>,
    #[serde(default)]
    pub current_word: Option<String>,
    #[serde(default)]
    pub current_word_progress: Option<String>,
    #[serde(default)]
    pub exercises: Option<ExerciseSet>,
}

impl ParsedObject {
    #[must_use]
    pub fn new(response: impl Into<String>, metadata: TurnMetadata) -> Self {
        Self {
            response: response.into(),
            current_category: metadata.current_category,
            current_word: metadata.current_word,
            current_word_progress: metadata.current_word_progress,
            exercises: metadata.exercises,
        }
    }

    /// Parse a complete body.
    ///
    /// # Errors
    ///
    /// [`TypeError::Json`] if `text` is not exactly one JSON object with a
    /// string `response` (surrounding whitespace is allowed).
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize as compact JSON.
    ///
    /// # Errors
    ///
    /// [`TypeError::Json`] if serialization fails, which does not happen for
    /// this shape in practice.
    pub fn to_json(&self) -> Result<String, TypeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Copy out the trailing fields.
    #[must_use]
    pub fn metadata(&self) -> TurnMetadata {
        TurnMetadata {
            current_category: self.current_category.clone(),
            current_word: self.current_word.clone(),
            current_word_progress: self.current_word_progress.clone(),
            exercises: self.exercises.clone(),
        }
    }
}
