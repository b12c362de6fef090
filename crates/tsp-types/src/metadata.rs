use serde::{Deserialize, Serialize};

use crate::exercise::ExerciseSet;

/// The fixed fields written after the streamed `response` value closes.
///
/// All four are nullable on the wire; `None` is written as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMetadata {
    #[serde(default)]
    pub current_category: Option<String>,
    #[serde(default)]
    pub current_word: Option<String>,
    #[serde(default)]
    pub current_word_progress: Option<String>,
    #[serde(default)]
    pub exercises: Option<ExerciseSet>,
}

impl TurnMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.current_category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.current_word = Some(word.into());
        self
    }

    #[must_use]
    pub fn with_word_progress(mut self, progress: impl Into<String>) -> Self {
        self.current_word_progress = Some(progress.into());
        self
    }

    #[must_use]
    pub fn with_exercises(mut self, exercises: ExerciseSet) -> Self {
        self.exercises = Some(exercises);
        self
    }

    /// `true` when every field is null.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
