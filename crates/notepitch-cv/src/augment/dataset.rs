//! Training-set generation from clean reference glyphs

use super::{Category, CompositeAugmentor, TransformLibrary, VariantSet};
use crate::config::AugmentConfig;
use crate::error::Result;
use crate::utils::ImageUtils;
use image::GrayImage;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// A source that could not be read and was left out of the batch
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one batch build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildSummary {
    /// `(note name, files written)` in processing order
    pub written: Vec<(String, usize)>,
    pub skipped: Vec<SkippedSource>,
}

impl BuildSummary {
    pub fn total_written(&self) -> usize {
        self.written.iter().map(|(_, n)| n).sum()
    }
}

/// Writes `9 * N` variants per reference image as `{note}_{index}.png`
pub struct DatasetBuilder {
    library: TransformLibrary,
    variants_per_category: usize,
    binarize_threshold: u8,
    output_dir: PathBuf,
}

impl DatasetBuilder {
    pub fn new<P: AsRef<Path>>(config: &AugmentConfig, output_dir: P) -> Result<Self> {
        Ok(Self {
            library: TransformLibrary::from_config(config)?,
            variants_per_category: config.variants_per_category,
            binarize_threshold: config.binarize_threshold,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Number of files produced for every readable source
    pub fn files_per_source(&self) -> usize {
        9 * self.variants_per_category
    }

    /// Pure-binary (0/255) version of a grayscale reference
    pub fn preprocess(&self, image: &GrayImage) -> GrayImage {
        ImageUtils::binarize(image, self.binarize_threshold)
    }

    /// All variant sets of one preprocessed glyph, concatenated in category
    /// order with the combined set (2N) last.
    pub fn generate<R: Rng + ?Sized>(&self, glyph: &GrayImage, rng: &mut R) -> VariantSet {
        let n = self.variants_per_category;
        let mut all = Vec::with_capacity(self.files_per_source());
        for category in Category::ALL {
            trace!("Drawing {} {} variants", n, category.name());
            all.extend(self.library.variants(category, glyph, n, rng));
        }
        let composite = CompositeAugmentor::new(&self.library);
        all.extend(composite.variants(glyph, 2 * n, rng));
        all
    }

    /// Preprocess, augment and persist one decoded reference image
    pub fn build_note<R: Rng + ?Sized>(
        &self,
        note_name: &str,
        source: &GrayImage,
        rng: &mut R,
    ) -> Result<usize> {
        let glyph = self.preprocess(source);
        let variants = self.generate(&glyph, rng);
        for (index, variant) in variants.iter().enumerate() {
            let path = self.output_dir.join(format!("{note_name}_{index}.png"));
            ImageUtils::save_gray(variant, &path)?;
        }
        debug!("Wrote {} variants for {}", variants.len(), note_name);
        Ok(variants.len())
    }

    /// Process sources strictly in order. Unreadable sources are skipped and
    /// reported; the rest of the batch still runs.
    pub fn build<P: AsRef<Path>, R: Rng + ?Sized>(
        &self,
        sources: &[P],
        rng: &mut R,
    ) -> Result<BuildSummary> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut summary = BuildSummary::default();

        for source in sources {
            let path = source.as_ref();
            let note_name = note_name_of(path);
            let image = match ImageUtils::load_grayscale(path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    summary.skipped.push(SkippedSource {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let written = self.build_note(&note_name, &image, rng)?;
            summary.written.push((note_name, written));
        }

        info!(
            "Dataset build finished: {} files from {} sources ({} skipped) in {:?}",
            summary.total_written(),
            summary.written.len(),
            summary.skipped.len(),
            self.output_dir
        );
        Ok(summary)
    }
}

/// Note name is the file stem: `refs/A4.png` → `A4`
pub fn note_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
