//! Tensor preparation and top-label extraction

use crate::error::{Error, Result};
use crate::traits::Classifier;
use image::GrayImage;
use ndarray::Array4;
use notepitch_core::{CanonicalSize, ClassificationResult, Pitch};

/// `(batch = 1, height, width, channel = 1)`, intensities in [0, 1]
pub type InputTensor = Array4<f32>;

/// Runs a classifier on images of exactly the canonical size
pub struct ClassificationAdapter<C> {
    classifier: C,
    size: CanonicalSize,
}

impl<C: Classifier> ClassificationAdapter<C> {
    pub fn new(classifier: C, size: CanonicalSize) -> Self {
        Self { classifier, size }
    }

    pub fn size(&self) -> CanonicalSize {
        self.size
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Scale to [0, 1] and reshape; rejects any size but the canonical one
    pub fn to_tensor(&self, image: &GrayImage) -> Result<InputTensor> {
        if !self.size.matches(image.dimensions()) {
            let (w, h) = image.dimensions();
            return Err(Error::ShapeMismatch {
                expected: self.size.to_string(),
                actual: format!("{h}x{w}"),
            });
        }
        let (h, w) = (self.size.height as usize, self.size.width as usize);
        Ok(Array4::from_shape_fn((1, h, w, 1), |(_, y, x, _)| {
            f32::from(image.get_pixel(x as u32, y as u32)[0]) / 255.0
        }))
    }

    pub fn classify(&self, image: &GrayImage) -> Result<ClassificationResult> {
        let tensor = self.to_tensor(image)?;
        let probabilities = self.classifier.predict(&tensor)?;
        top_prediction(&probabilities)
    }
}

/// Argmax over a vocabulary-ordered probability vector; the first index
/// wins ties
pub fn top_prediction(probabilities: &[f32]) -> Result<ClassificationResult> {
    if probabilities.len() != Pitch::COUNT {
        return Err(Error::ShapeMismatch {
            expected: format!("{} probabilities", Pitch::COUNT),
            actual: format!("{} probabilities", probabilities.len()),
        });
    }
    let (best, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bp), (i, p)| {
            if p > bp { (i, p) } else { (bi, bp) }
        });
    let pitch = Pitch::from_index(best)
        .ok_or_else(|| Error::Classifier(format!("index {best} outside vocabulary")))?;
    Ok(ClassificationResult::new(pitch, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::cell::Cell;

    /// One-hot on a fixed pitch; counts calls
    struct OneHot {
        pitch: Pitch,
        calls: Cell<usize>,
    }

    impl Classifier for OneHot {
        fn predict(&self, input: &InputTensor) -> Result<Vec<f32>> {
            assert_eq!(input.shape()[0], 1);
            assert_eq!(input.shape()[3], 1);
            self.calls.set(self.calls.get() + 1);
            let mut probs = vec![0.0; Pitch::COUNT];
            probs[self.pitch.index()] = 1.0;
            Ok(probs)
        }
    }

    #[test]
    fn test_tensor_shape_and_scale() -> Result<()> {
        let adapter = ClassificationAdapter::new(
            OneHot { pitch: Pitch::C4, calls: Cell::new(0) },
            CanonicalSize::new(4, 3),
        );
        let image = GrayImage::from_fn(3, 4, |x, y| Luma([if x == 2 && y == 1 { 255 } else { 0 }]));
        let tensor = adapter.to_tensor(&image)?;
        assert_eq!(tensor.shape(), &[1, 4, 3, 1]);
        assert_eq!(tensor[[0, 1, 2, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        Ok(())
    }

    #[test]
    fn test_wrong_size_rejected_before_classifier() {
        let adapter = ClassificationAdapter::new(
            OneHot { pitch: Pitch::C4, calls: Cell::new(0) },
            CanonicalSize::new(100, 60),
        );
        let err = adapter.classify(&GrayImage::new(100, 60)).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(adapter.classifier().calls.get(), 0);
    }

    #[test]
    fn test_one_hot_classification() -> Result<()> {
        let adapter = ClassificationAdapter::new(
            OneHot { pitch: Pitch::E5, calls: Cell::new(0) },
            CanonicalSize::new(10, 6),
        );
        let result = adapter.classify(&GrayImage::new(6, 10))?;
        assert_eq!(result.pitch(), Pitch::E5);
        assert_eq!(result.confidence(), 1.0);
        assert_eq!(adapter.classifier().calls.get(), 1);
        Ok(())
    }

    #[test]
    fn test_top_prediction() -> Result<()> {
        let mut probs = vec![0.01; Pitch::COUNT];
        probs[3] = 0.6;
        probs[9] = 0.6;
        let result = top_prediction(&probs)?;
        assert_eq!(result.pitch(), Pitch::F4);
        assert!((result.confidence() - 0.6).abs() < 1e-6);
        assert!(top_prediction(&probs[..14]).is_err());
        Ok(())
    }
}
