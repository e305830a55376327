//! Reference directory access

use super::{Template, TemplateSet};
use crate::augment::dataset::note_name_of;
use crate::error::{Error, Result};
use crate::utils::image::ImageUtils;
use notepitch_core::{CanonicalSize, Pitch};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds and loads the per-pitch reference images
pub struct TemplateLoader {
    reference_dir: PathBuf,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    pub fn new<P: AsRef<Path>>(reference_dir: P) -> Self {
        Self {
            reference_dir: reference_dir.as_ref().to_path_buf(),
            supported_extensions: vec!["png".to_string()],
        }
    }

    /// Every reference image path, sorted
    pub fn reference_paths(&self) -> Result<Vec<PathBuf>> {
        let extensions: Vec<&str> = self.supported_extensions.iter().map(String::as_str).collect();
        ImageUtils::list_images(&self.reference_dir, &extensions)
    }

    /// Path of the reference for `pitch`; file name matching is
    /// case-insensitive
    pub fn find_reference(&self, pitch: Pitch) -> Result<PathBuf> {
        self.reference_paths()?
            .into_iter()
            .find(|p| note_name_of(p).eq_ignore_ascii_case(pitch.as_str()))
            .ok_or_else(|| {
                Error::config(
                    "reference_dir",
                    format!("no reference image for {} in {:?}", pitch, self.reference_dir),
                )
            })
    }

    /// Natural dimensions of the designated reference
    pub fn canonical_size(&self, pitch: Pitch) -> Result<CanonicalSize> {
        let path = self.find_reference(pitch)?;
        let size = CanonicalSize::from_dimensions(ImageUtils::dimensions(&path)?);
        debug!("Canonical size {} from {:?}", size, path);
        Ok(size)
    }

    /// Binarize every pitch-named reference and resize it to `size`.
    /// Files whose stem is not a pitch symbol are ignored.
    pub fn load_set(&self, size: CanonicalSize, binarize_threshold: u8) -> Result<TemplateSet> {
        let mut set = TemplateSet::new(size);
        for path in self.reference_paths()? {
            let name = note_name_of(&path);
            let Ok(pitch) = name.parse::<Pitch>() else {
                warn!("Ignoring reference {:?}: '{}' is not a pitch", path, name);
                continue;
            };
            let gray = ImageUtils::load_grayscale(&path)?;
            let binary = ImageUtils::binarize(&gray, binarize_threshold);
            let image = ImageUtils::resize_linear(&binary, size.width, size.height);
            set.insert(Template::new(pitch, image));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_refs(dir: &Path) -> Result<()> {
        ImageUtils::save_gray(&GrayImage::from_pixel(60, 100, Luma([255])), dir.join("A4.png"))?;
        ImageUtils::save_gray(&GrayImage::from_pixel(30, 50, Luma([0])), dir.join("c4.png"))?;
        ImageUtils::save_gray(&GrayImage::from_pixel(10, 10, Luma([0])), dir.join("notes.png"))?;
        Ok(())
    }

    #[test]
    fn test_canonical_size_from_reference() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_refs(dir.path())?;
        let loader = TemplateLoader::new(dir.path());
        assert_eq!(loader.canonical_size(Pitch::A4)?, CanonicalSize::new(100, 60));
        assert!(loader.canonical_size(Pitch::G5).is_err());
        Ok(())
    }

    #[test]
    fn test_load_set_resizes_and_skips_unknown() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_refs(dir.path())?;
        let loader = TemplateLoader::new(dir.path());
        let set = loader.load_set(CanonicalSize::new(100, 60), 127)?;
        assert_eq!(set.len(), 2);
        let c4 = set.get(Pitch::C4).unwrap();
        assert_eq!(c4.image.dimensions(), (60, 100));
        assert!(set.get(Pitch::A4).is_some());
        let order: Vec<Pitch> = set.iter().map(|t| t.pitch).collect();
        assert_eq!(order, [Pitch::C4, Pitch::A4]);
        Ok(())
    }
}
