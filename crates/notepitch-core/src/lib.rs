//! Domain vocabulary shared by the augmentation and inference pipelines.

pub mod notes;

pub use notes::{CanonicalSize, ClassificationResult, ParsePitchError, Pitch};
