//! Pick a few generated images, classify them and export their labels

use crate::classify::ClassificationAdapter;
use crate::error::Result;
use crate::traits::Classifier;
use crate::utils::ImageUtils;
use notepitch_core::ClassificationResult;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// File name → prediction
pub type LabelMap = BTreeMap<String, ClassificationResult>;

pub struct SampleLabeler<'a, C> {
    adapter: &'a ClassificationAdapter<C>,
    count: usize,
}

impl<'a, C: Classifier> SampleLabeler<'a, C> {
    pub fn new(adapter: &'a ClassificationAdapter<C>, count: usize) -> Self {
        Self { adapter, count }
    }

    /// Copy up to `count` random images from `generated_dir` into
    /// `selected_dir`, classify each after resizing to the canonical size,
    /// and write the labels as pretty JSON to `labels_file`.
    pub fn run<R: Rng + ?Sized>(
        &self,
        generated_dir: &Path,
        selected_dir: &Path,
        labels_file: &Path,
        rng: &mut R,
    ) -> Result<LabelMap> {
        let candidates = ImageUtils::list_images(generated_dir, &["png"])?;
        let selected: Vec<_> = candidates.choose_multiple(rng, self.count).cloned().collect();
        std::fs::create_dir_all(selected_dir)?;

        let size = self.adapter.size();
        let mut labels = LabelMap::new();
        for path in &selected {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().trim().to_string())
                .unwrap_or_default();
            std::fs::copy(path, selected_dir.join(&name))?;

            let gray = ImageUtils::load_grayscale(path)?;
            let resized = ImageUtils::resize_linear(&gray, size.width, size.height);
            let result = self.adapter.classify(&resized)?;
            labels.insert(name, result);
        }

        std::fs::write(labels_file, serde_json::to_string_pretty(&labels)?)?;
        info!(
            "Labelled {} of {} generated images into {:?}",
            labels.len(),
            candidates.len(),
            labels_file
        );
        Ok(labels)
    }
}
