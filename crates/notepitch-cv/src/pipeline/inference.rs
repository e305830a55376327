//! Single-image inference: localize, normalize, classify, report

use crate::classify::ClassificationAdapter;
use crate::config::InferenceConfig;
use crate::error::{Error, Result};
use crate::localize::{CanvasNormalizer, NoteLocalizer};
use crate::traits::Classifier;
use crate::utils::ImageUtils;
use crate::BBox;
use image::DynamicImage;
use notepitch_core::{CanonicalSize, ClassificationResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const INPUT_FILE: &str = "input.png";
pub const BINARY_FILE: &str = "binary_output.png";
pub const CENTERED_FILE: &str = "centered.png";

/// Structured record handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceReport {
    pub images: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    pub message: String,
}

impl InferenceReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How one inference call ended
#[derive(Debug)]
pub enum InferenceOutcome {
    Classified {
        report: InferenceReport,
        result: ClassificationResult,
        bbox: BBox,
    },
    /// Binarization found nothing; only the binary image was written
    NoGlyph { report: InferenceReport },
    /// A fatal error, already rendered into the report
    Failed { report: InferenceReport, error: Error },
}

impl InferenceOutcome {
    pub fn report(&self) -> &InferenceReport {
        match self {
            InferenceOutcome::Classified { report, .. }
            | InferenceOutcome::NoGlyph { report }
            | InferenceOutcome::Failed { report, .. } => report,
        }
    }

    pub fn result(&self) -> Option<ClassificationResult> {
        match self {
            InferenceOutcome::Classified { result, .. } => Some(*result),
            _ => None,
        }
    }

    /// Non-zero only for fatal failures
    pub fn exit_code(&self) -> i32 {
        match self {
            InferenceOutcome::Failed { .. } => 1,
            _ => 0,
        }
    }

    fn failed(error: Error) -> Self {
        let message = match &error {
            Error::ImageDecode { source, .. } => format!("Error reading image: {source}"),
            other => format!("Error processing image: {other}"),
        };
        InferenceOutcome::Failed {
            report: InferenceReport {
                images: Vec::new(),
                text: None,
                message,
            },
            error,
        }
    }
}

/// Localizer → Canvas Normalizer → Classification Adapter
pub struct InferencePipeline<C> {
    localizer: NoteLocalizer,
    normalizer: CanvasNormalizer,
    adapter: ClassificationAdapter<C>,
    output_dir: PathBuf,
}

impl<C: Classifier> InferencePipeline<C> {
    pub fn new(classifier: C, size: CanonicalSize, config: &InferenceConfig) -> Self {
        Self {
            localizer: NoteLocalizer::new(),
            normalizer: CanvasNormalizer::new(config.margin, size),
            adapter: ClassificationAdapter::new(classifier, size),
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn adapter(&self) -> &ClassificationAdapter<C> {
        &self.adapter
    }

    /// Never returns an error: every failure is rendered into the outcome.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> InferenceOutcome {
        let image = match ImageUtils::load(path.as_ref()) {
            Ok(image) => image,
            Err(e) => {
                warn!("Could not read {:?}: {}", path.as_ref(), e);
                return InferenceOutcome::failed(e);
            }
        };
        match self.run_image(&image) {
            Ok(outcome) => outcome,
            Err(e) => InferenceOutcome::failed(e),
        }
    }

    /// Writes up to three images into the output directory. A missing glyph
    /// yields `NoGlyph`; the classifier is not consulted in that case.
    pub fn run_image(&self, image: &DynamicImage) -> Result<InferenceOutcome> {
        std::fs::create_dir_all(&self.output_dir)?;

        let input_path = self.output_dir.join(INPUT_FILE);
        ImageUtils::save_dynamic(image, &input_path)?;

        let binarization = self.localizer.binarize(&image.to_luma8());
        let binary_path = self.output_dir.join(BINARY_FILE);
        ImageUtils::save_gray(&binarization.binary, &binary_path)?;

        let located = match self.localizer.locate(binarization) {
            Ok(located) => located,
            Err(e) if !e.is_fatal() => {
                info!("No note detected");
                return Ok(InferenceOutcome::NoGlyph {
                    report: InferenceReport {
                        images: vec![absolute(binary_path)],
                        text: None,
                        message: "No note detected.".to_string(),
                    },
                });
            }
            Err(e) => return Err(e),
        };

        let centered = self.normalizer.center(&located.cropped);
        let centered_path = self.output_dir.join(CENTERED_FILE);
        ImageUtils::save_gray(&centered.canvas, &centered_path)?;

        let normalized = self.normalizer.resize(&centered);
        let result = self.adapter.classify(&normalized)?;
        info!(
            "Predicted {} ({:.2}) for glyph at {:?}",
            result.pitch(),
            result.confidence(),
            located.bbox
        );

        Ok(InferenceOutcome::Classified {
            report: InferenceReport {
                images: vec![
                    absolute(input_path),
                    absolute(binary_path),
                    absolute(centered_path),
                ],
                text: Some(vec![
                    "Input Image".to_string(),
                    "Binary Image".to_string(),
                    "Centered Image".to_string(),
                ]),
                message: result.to_string(),
            },
            result,
            bbox: located.bbox,
        })
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}
