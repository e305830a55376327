use super::Pitch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (height, width) every normalized image must match before
/// classification. Fixed once per run from a reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSize {
    pub height: u32,
    pub width: u32,
}

impl CanonicalSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Build from `image`-style `(width, height)` dimensions.
    pub fn from_dimensions((width, height): (u32, u32)) -> Self {
        Self { height, width }
    }

    pub fn matches(&self, (width, height): (u32, u32)) -> bool {
        self.width == width && self.height == height
    }
}

impl fmt::Display for CanonicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Top label and its probability for one inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "label")]
    pitch: Pitch,
    confidence: f32,
}

impl ClassificationResult {
    /// Confidence is clamped into [0, 1].
    pub fn new(pitch: Pitch, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { pitch, confidence }
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prediction: {}\nConfidence: {:.2}", self.pitch, self.confidence)
    }
}
