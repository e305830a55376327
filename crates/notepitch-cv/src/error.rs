//! Error taxonomy for the augmentation and inference pipelines.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be read or decoded as an image.
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Binarization left no foreground contour to localize.
    #[error("no note glyph detected")]
    NoGlyphDetected,

    /// A degenerate parameter, rejected at startup.
    #[error("invalid configuration for {name}: {reason}")]
    Configuration { name: String, reason: String },

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("classifier failed: {0}")]
    Classifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Configuration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the condition should abort the current call rather than
    /// produce a partial result.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::NoGlyphDetected)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
