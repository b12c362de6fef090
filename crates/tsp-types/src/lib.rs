#![warn(clippy::pedantic)]

pub mod error;
pub mod exercise;
pub mod metadata;
pub mod parsed;

pub use error::TypeError;
pub use exercise::{Exercise, ExerciseLevel, ExerciseSet};
pub use metadata::TurnMetadata;
pub use parsed::ParsedObject;
