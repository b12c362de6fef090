use std::fmt;

use serde::{Deserialize, Serialize};

/// A single word-ordering exercise: the target sentence and the shuffled
/// form shown to the learner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub unscrambled: String,
    pub scrambled: String,
}

/// Difficulty tiers, in the order they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExerciseLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl ExerciseLevel {
    pub const ALL: [Self; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExerciseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercises attached to a tutor turn.
///
/// ```json
/// {
///   "basic":        { "unscrambled": "...", "scrambled": "..." },
///   "intermediate": { "unscrambled": "...", "scrambled": "..." },
///   "advanced":     { "unscrambled": "...", "scrambled": "..." },
///   "count": 3
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub basic: Exercise,
    pub intermediate: Exercise,
    pub advanced: Exercise,
    pub count: u32,
}

impl ExerciseSet {
    #[must_use]
    pub fn get(&self, level: ExerciseLevel) -> &Exercise {
        match level {
            ExerciseLevel::Basic => &self.basic,
            ExerciseLevel::Intermediate => &self.intermediate,
            ExerciseLevel::Advanced => &self.advanced,
        }
    }

    /// Iterate the tiers from basic to advanced.
    pub fn levels(&self) -> impl Iterator<Item = (ExerciseLevel, &Exercise)> {
        ExerciseLevel::ALL
            .into_iter()
            .map(move |level| (level, self.get(level)))
    }
}
