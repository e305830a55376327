//! End-to-end flows built from the lower-level stages

pub mod inference;
pub mod sample;

pub use inference::{InferenceOutcome, InferencePipeline, InferenceReport};
pub use sample::SampleLabeler;
