//! Note Pitch Computer Vision Library
//!
//! Training-set augmentation for a musical-note pitch classifier, and the
//! localization/normalization pipeline that prepares a single uploaded note
//! image for classification.

pub mod augment;
pub mod bbox;
pub mod classify;
pub mod config;
pub mod error;
pub mod localize;
pub mod pipeline;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use augment::{Category, CategorySet, CompositeAugmentor, DatasetBuilder, TransformLibrary};
pub use bbox::BBox;
pub use classify::ClassificationAdapter;
pub use config::{AugmentConfig, InferenceConfig, PipelineConfig, SampleConfig};
pub use error::{Error, Result};
pub use localize::{CanvasNormalizer, NoteLocalizer};
pub use pipeline::{InferenceOutcome, InferencePipeline, InferenceReport, SampleLabeler};
pub use template::{TemplateClassifier, TemplateLoader};

/// Core traits for the CV system
pub mod traits {
    use crate::classify::InputTensor;
    use crate::Result;

    /// Anything mapping a normalized image tensor to a probability vector
    /// over the pitch vocabulary, in vocabulary order
    pub trait Classifier {
        fn predict(&self, input: &InputTensor) -> Result<Vec<f32>>;
    }

    impl<C: Classifier + ?Sized> Classifier for Box<C> {
        fn predict(&self, input: &InputTensor) -> Result<Vec<f32>> {
            (**self).predict(input)
        }
    }

    impl<C: Classifier + ?Sized> Classifier for &C {
        fn predict(&self, input: &InputTensor) -> Result<Vec<f32>> {
            (**self).predict(input)
        }
    }
}
