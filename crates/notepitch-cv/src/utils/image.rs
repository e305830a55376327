//! Image loading, saving and small pixel-level helpers

use crate::error::{Error, Result};
use image::{imageops, DynamicImage, GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use std::path::{Path, PathBuf};

/// Intensity used for background and for any area exposed by a transform
pub const WHITE: Luma<u8> = Luma([255]);

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Decode any supported format from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path = path.as_ref();
        image::open(path).map_err(|source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load image as single-channel
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
        Ok(Self::load(path)?.to_luma8())
    }

    /// Natural `(width, height)` of an image on disk
    pub fn dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
        let path = path.as_ref();
        image::image_dimensions(path).map_err(|source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save single-channel image; format follows the extension
    pub fn save_gray<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
        let path = path.as_ref();
        image.save(path).map_err(|source| Error::ImageSave {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_dynamic<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
        let path = path.as_ref();
        image.save(path).map_err(|source| Error::ImageSave {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fixed global threshold: `> level` becomes 255, everything else 0
    pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
        threshold(image, level, ThresholdType::Binary)
    }

    pub fn invert(image: &GrayImage) -> GrayImage {
        let mut inverted = image.clone();
        imageops::invert(&mut inverted);
        inverted
    }

    /// Bilinear resize to exactly `width x height`
    pub fn resize_linear(image: &GrayImage, width: u32, height: u32) -> GrayImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        imageops::resize(image, width, height, imageops::FilterType::Triangle)
    }

    pub fn white_canvas(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, WHITE)
    }

    /// Files in `dir` whose extension is one of `extensions`
    /// (case-insensitive), sorted by path
    pub fn list_images<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    extensions.iter().any(|e| *e == ext)
                })
                .unwrap_or(false);
            if matches && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Border padding that repeats the outermost row/column
    pub fn pad_replicate(
        image: &GrayImage,
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
    ) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }
        GrayImage::from_fn(width + left + right, height + top + bottom, |x, y| {
            let sx = x.saturating_sub(left).min(width - 1);
            let sy = y.saturating_sub(top).min(height - 1);
            *image.get_pixel(sx, sy)
        })
    }
}
