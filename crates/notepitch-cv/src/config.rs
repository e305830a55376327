//! Pipeline configuration

use crate::error::{Error, Result};
use notepitch_core::Pitch;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration shared by the CLI subcommands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// One clean `.png` per pitch, named after the pitch (`A4.png`)
    pub reference_dir: PathBuf,
    /// Where the Dataset Builder writes `{note}_{index}.png`
    pub dataset_dir: PathBuf,
    pub augment: AugmentConfig,
    pub inference: InferenceConfig,
    pub sample: SampleConfig,
}

/// Augmentation parameter ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// N: variants per single-operator category (Combined produces 2N)
    pub variants_per_category: usize,
    /// Pad widths are drawn from `[pad_min, max_pad)`
    pub pad_min: u32,
    pub max_pad: u32,
    /// Closed interval, pixels
    pub translate_range: (i32, i32),
    /// Closed interval, degrees
    pub rotate_range: (f32, f32),
    /// Gaussian kernel side, odd
    pub blur_kernel: u32,
    pub stretch_range: (f32, f32),
    pub zoom_range: (f32, f32),
    /// Global threshold applied to reference images before augmenting
    pub binarize_threshold: u8,
    pub seed: Option<u64>,
}

/// Localization, normalization and classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// White border added around the glyph on the square canvas
    pub margin: u32,
    /// Reference whose natural dimensions define the canonical size
    pub reference_note: Pitch,
    pub output_dir: PathBuf,
    /// Softmax temperature of the built-in template classifier
    pub classifier_temperature: f32,
}

/// Sample-and-label batch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub count: usize,
    pub selected_dir: PathBuf,
    pub labels_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_dir: "images/original_notes_images".into(),
            dataset_dir: "images/app_images/gen_images".into(),
            augment: AugmentConfig::default(),
            inference: InferenceConfig::default(),
            sample: SampleConfig::default(),
        }
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            variants_per_category: 1,
            pad_min: 50,
            max_pad: 400,
            translate_range: (-20, 20),
            rotate_range: (-5.0, 5.0),
            blur_kernel: 21,
            stretch_range: (0.5, 1.5),
            zoom_range: (1.1, 2.0),
            binarize_threshold: 127,
            seed: None,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            margin: 10,
            reference_note: Pitch::A4,
            output_dir: "images/app_images/uploaded_images/gen_images".into(),
            classifier_temperature: 0.05,
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 5,
            selected_dir: "images/app_images/selected_images".into(),
            labels_file: "labels.json".into(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.augment.validate()?;
        self.inference.validate()?;
        if self.sample.count == 0 {
            return Err(Error::config("sample.count", "must be at least 1"));
        }
        Ok(())
    }
}

impl AugmentConfig {
    /// Reject degenerate ranges before any image is touched.
    pub fn validate(&self) -> Result<()> {
        if self.variants_per_category == 0 {
            return Err(Error::config("variants_per_category", "must be at least 1"));
        }
        if self.max_pad <= self.pad_min {
            return Err(Error::config(
                "max_pad",
                format!("must exceed pad_min ({}), got {}", self.pad_min, self.max_pad),
            ));
        }
        let (t_lo, t_hi) = self.translate_range;
        if t_lo > t_hi {
            return Err(Error::config("translate_range", "min is greater than max"));
        }
        check_interval("rotate_range", self.rotate_range)?;
        check_interval("stretch_range", self.stretch_range)?;
        if self.stretch_range.0 <= 0.0 {
            return Err(Error::config("stretch_range", "factors must be positive"));
        }
        check_interval("zoom_range", self.zoom_range)?;
        if self.zoom_range.0 <= 1.0 {
            return Err(Error::config("zoom_range", "min must exceed 1.0 (zoom-in only)"));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(Error::config("blur_kernel", "must be odd and positive"));
        }
        Ok(())
    }

    /// Gaussian sigma for the configured kernel, derived the usual way when
    /// only a kernel size is given.
    pub fn blur_sigma(&self) -> f32 {
        0.3 * ((self.blur_kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<()> {
        let t = self.classifier_temperature;
        // also catches NaN
        if !(t > 0.0 && t.is_finite()) {
            return Err(Error::config("classifier_temperature", "must be positive and finite"));
        }
        Ok(())
    }
}

fn check_interval(name: &str, (lo, hi): (f32, f32)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(Error::config(name, format!("invalid interval [{lo}, {hi}]")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() -> Result<()> {
        PipelineConfig::default().validate()
    }

    #[test]
    fn test_degenerate_pad_rejected() {
        let config = AugmentConfig {
            max_pad: 50,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_zoom_out_rejected() {
        let config = AugmentConfig {
            zoom_range: (0.9, 2.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_must_be_positive_and_finite() {
        for t in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let config = InferenceConfig {
                classifier_temperature: t,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{t}");
        }
        assert!(InferenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_even_kernel_rejected() {
        let config = AugmentConfig {
            blur_kernel: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blur_sigma_for_default_kernel() {
        let sigma = AugmentConfig::default().blur_sigma();
        assert!((sigma - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "augment": { "variants_per_category": 3 } }"#)?;
        assert_eq!(config.augment.variants_per_category, 3);
        assert_eq!(config.augment.max_pad, 400);
        assert_eq!(config.inference.reference_note, Pitch::A4);
        Ok(())
    }
}
