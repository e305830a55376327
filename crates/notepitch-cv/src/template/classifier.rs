//! Built-in classifier scoring inputs against the reference templates

use super::TemplateSet;
use crate::classify::InputTensor;
use crate::error::{Error, Result};
use crate::traits::Classifier;
use notepitch_core::{CanonicalSize, Pitch};

/// Zero-mean normalized correlation against each reference, turned into a
/// probability vector with a temperature softmax. Pitches without a
/// template get probability 0.
pub struct TemplateClassifier {
    size: CanonicalSize,
    /// Per pitch, intensities in [0, 1] row-major
    templates: Vec<Option<Vec<f32>>>,
    temperature: f32,
}

impl TemplateClassifier {
    pub fn new(set: &TemplateSet, temperature: f32) -> Result<Self> {
        if set.is_empty() {
            return Err(Error::config("reference_dir", "no pitch templates found"));
        }
        // also catches NaN
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(Error::config("classifier_temperature", "must be positive and finite"));
        }
        let templates = Pitch::ALL
            .iter()
            .map(|&p| {
                set.get(p).map(|t| {
                    t.image
                        .pixels()
                        .map(|px| f32::from(px[0]) / 255.0)
                        .collect()
                })
            })
            .collect();
        Ok(Self {
            size: set.size(),
            templates,
            temperature,
        })
    }

    pub fn size(&self) -> CanonicalSize {
        self.size
    }
}

impl Classifier for TemplateClassifier {
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>> {
        let expected = [1, self.size.height as usize, self.size.width as usize, 1];
        if input.shape() != &expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected:?}"),
                actual: format!("{:?}", input.shape()),
            });
        }
        // standard layout: (1, h, w, 1) flattens row-major like the templates
        let sample: Vec<f32> = input.iter().copied().collect();

        let logits: Vec<Option<f32>> = self
            .templates
            .iter()
            .map(|t| {
                t.as_ref()
                    .map(|t| ccoeff_normed(&sample, t) / self.temperature)
            })
            .collect();
        let max = logits
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = logits
            .iter()
            .map(|l| l.map_or(0.0, |l| (l - max).exp()))
            .collect();
        let total: f32 = exp.iter().sum();
        Ok(exp.into_iter().map(|e| e / total).collect())
    }
}

/// Correlation coefficient in [-1, 1]; 0 when either side is constant
pub fn ccoeff_normed(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mean_a = a[..n].iter().sum::<f32>() / n as f32;
    let mean_b = b[..n].iter().sum::<f32>() / n as f32;
    let (mut cross, mut var_a, mut var_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cross += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denom = (var_a * var_b).sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        (cross / denom).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationAdapter;
    use crate::template::Template;
    use image::{GrayImage, Luma};

    fn bar(width: u32, height: u32, column: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x.abs_diff(column) < 3 { Luma([0]) } else { Luma([255]) }
        })
    }

    fn set() -> TemplateSet {
        let size = CanonicalSize::new(20, 30);
        let mut set = TemplateSet::new(size);
        set.insert(Template::new(Pitch::C4, bar(30, 20, 5)));
        set.insert(Template::new(Pitch::G4, bar(30, 20, 15)));
        set.insert(Template::new(Pitch::C6, bar(30, 20, 25)));
        set
    }

    #[test]
    fn test_identical_template_wins() -> Result<()> {
        let adapter = ClassificationAdapter::new(TemplateClassifier::new(&set(), 0.05)?, set().size());
        let result = adapter.classify(&bar(30, 20, 15))?;
        assert_eq!(result.pitch(), Pitch::G4);
        assert!(result.confidence() > 0.5);
        Ok(())
    }

    #[test]
    fn test_probabilities_sum_to_one_and_skip_missing() -> Result<()> {
        let classifier = TemplateClassifier::new(&set(), 0.05)?;
        let adapter = ClassificationAdapter::new(classifier, set().size());
        let tensor = adapter.to_tensor(&bar(30, 20, 5))?;
        let probs = adapter.classifier().predict(&tensor)?;
        assert_eq!(probs.len(), Pitch::COUNT);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert_eq!(probs[Pitch::A4.index()], 0.0);
        Ok(())
    }

    #[test]
    fn test_empty_set_rejected() {
        let empty = TemplateSet::new(CanonicalSize::new(5, 5));
        assert!(TemplateClassifier::new(&empty, 0.05).is_err());
    }

    #[test]
    fn test_bad_temperature_rejected() {
        for t in [0.0, -1.0, f32::NAN] {
            assert!(TemplateClassifier::new(&set(), t).is_err(), "{t}");
        }
    }

    #[test]
    fn test_ccoeff_normed() {
        let a = [0.0, 1.0, 0.0, 1.0];
        let b = [1.0, 0.0, 1.0, 0.0];
        assert!((ccoeff_normed(&a, &a) - 1.0).abs() < 1e-6);
        assert!((ccoeff_normed(&a, &b) + 1.0).abs() < 1e-6);
        assert_eq!(ccoeff_normed(&a, &[0.5; 4]), 0.0);
    }
}
