//! Otsu binarization and dominant-contour cropping.
//!
//! Two binary images come out of the threshold step: a foreground mask
//! (glyph = 255) that drives contour search, and its complement (glyph = 0
//! on white) which is what gets cropped. The complement uses the same
//! polarity as the augmentation engine's training images.

use crate::bbox::BBox;
use crate::error::{Error, Result};
use crate::utils::ImageUtils;
use image::{imageops, DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::point::Point;
use tracing::debug;

/// Result of thresholding a raw input
#[derive(Debug, Clone)]
pub struct Binarization {
    pub level: u8,
    /// Foreground (darker than `level`) as 255
    pub mask: GrayImage,
    /// Glyph dark on white
    pub binary: GrayImage,
}

/// A located glyph
#[derive(Debug, Clone)]
pub struct Localization {
    pub binarization: Binarization,
    pub bbox: BBox,
    /// `binary` restricted to `bbox`
    pub cropped: GrayImage,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoteLocalizer;

impl NoteLocalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn binarize(&self, gray: &GrayImage) -> Binarization {
        let level = otsu_level(gray);
        let mask = threshold(gray, level, ThresholdType::BinaryInverted);
        let binary = ImageUtils::invert(&mask);
        Binarization {
            level,
            mask,
            binary,
        }
    }

    /// Bounding box of the largest external contour, or `NoGlyphDetected`
    pub fn locate(&self, binarization: Binarization) -> Result<Localization> {
        // contour tracing only starts an outer border after a background pixel
        let contours = find_contours::<i32>(&with_background_border(&binarization.mask));
        let external: Vec<&Contour<i32>> = contours
            .iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .collect();

        // reversed so that ties resolve to the first contour found
        let largest = external
            .iter()
            .rev()
            .max_by(|a, b| contour_area(&a.points).total_cmp(&contour_area(&b.points)))
            .ok_or(Error::NoGlyphDetected)?;

        let (width, height) = binarization.binary.dimensions();
        let points: Vec<Point<i32>> = largest
            .points
            .iter()
            .map(|p| Point::new(p.x - 1, p.y - 1))
            .collect();
        let bbox = BBox::from_points(&points)
            .ok_or(Error::NoGlyphDetected)?
            .clamp_to(width, height);
        debug!(
            "Otsu level {}, {} external contours, glyph at {:?}",
            binarization.level,
            external.len(),
            bbox
        );

        let cropped =
            imageops::crop_imm(&binarization.binary, bbox.x, bbox.y, bbox.width, bbox.height)
                .to_image();
        Ok(Localization {
            binarization,
            bbox,
            cropped,
        })
    }

    /// Grayscale conversion, binarization and cropping in one call
    pub fn localize(&self, image: &DynamicImage) -> Result<Localization> {
        self.locate(self.binarize(&image.to_luma8()))
    }
}

/// `mask` surrounded by a one pixel background frame
fn with_background_border(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, mask, 1, 1);
    framed
}

/// Polygon area by the shoelace formula
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    (twice as f64 / 2.0).abs()
}
