pub mod pitch;
pub mod result;

pub use pitch::{ParsePitchError, Pitch};
pub use result::{CanonicalSize, ClassificationResult};
