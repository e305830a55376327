//! Square white canvas centering and resize to the canonical template size

use crate::utils::ImageUtils;
use image::{imageops, GrayImage};
use notepitch_core::CanonicalSize;

/// Glyph pasted at the center of a square white canvas
#[derive(Debug, Clone)]
pub struct CenteredGlyph {
    pub canvas: GrayImage,
    /// `(x, y)` of the glyph's top-left corner on the canvas
    pub offset: (u32, u32),
    /// `(width, height)` of the pasted glyph
    pub glyph_size: (u32, u32),
}

impl CenteredGlyph {
    pub fn side(&self) -> u32 {
        self.canvas.width()
    }

    /// Cut the glyph back out at the recorded offset
    pub fn extract(&self) -> GrayImage {
        let (x, y) = self.offset;
        let (w, h) = self.glyph_size;
        imageops::crop_imm(&self.canvas, x, y, w, h).to_image()
    }
}

#[derive(Debug, Clone)]
pub struct CanvasNormalizer {
    margin: u32,
    target: CanonicalSize,
}

impl CanvasNormalizer {
    pub fn new(margin: u32, target: CanonicalSize) -> Self {
        Self { margin, target }
    }

    pub fn target(&self) -> CanonicalSize {
        self.target
    }

    /// Canvas side is `max(h, w) + margin`; the glyph is never clipped.
    pub fn center(&self, glyph: &GrayImage) -> CenteredGlyph {
        let (w, h) = glyph.dimensions();
        let side = w.max(h) + self.margin;
        let offset = ((side - w) / 2, (side - h) / 2);

        let mut canvas = ImageUtils::white_canvas(side, side);
        imageops::replace(&mut canvas, glyph, offset.0 as i64, offset.1 as i64);
        CenteredGlyph {
            canvas,
            offset,
            glyph_size: (w, h),
        }
    }

    /// Bilinear resize of a centered canvas to the canonical size
    pub fn resize(&self, centered: &CenteredGlyph) -> GrayImage {
        ImageUtils::resize_linear(&centered.canvas, self.target.width, self.target.height)
    }

    pub fn normalize(&self, glyph: &GrayImage) -> GrayImage {
        self.resize(&self.center(glyph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn pattern(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([if (x * 3 + y * 7) % 5 == 0 { 0 } else { 255 }]))
    }

    #[test]
    fn test_canvas_side_and_round_trip() {
        let normalizer = CanvasNormalizer::new(10, CanonicalSize::new(100, 60));
        for (w, h) in [(1, 1), (7, 30), (30, 7), (25, 25), (64, 13)] {
            let glyph = pattern(w, h);
            let centered = normalizer.center(&glyph);
            assert_eq!(centered.side(), w.max(h) + 10);
            assert_eq!(centered.canvas.height(), centered.side());
            assert_eq!(centered.offset, ((centered.side() - w) / 2, (centered.side() - h) / 2));
            assert_eq!(centered.extract(), glyph);
        }
    }

    #[test]
    fn test_margin_is_white() {
        let normalizer = CanvasNormalizer::new(10, CanonicalSize::new(100, 60));
        let centered = normalizer.center(&GrayImage::from_pixel(20, 8, Luma([0])));
        assert_eq!(centered.canvas.get_pixel(0, 0)[0], 255);
        assert_eq!(centered.canvas.get_pixel(29, 29)[0], 255);
        assert_eq!(centered.canvas.get_pixel(15, 15)[0], 0);
    }

    #[test]
    fn test_normalize_matches_canonical_size() {
        let normalizer = CanvasNormalizer::new(10, CanonicalSize::new(100, 60));
        let out = normalizer.normalize(&pattern(33, 47));
        assert!(normalizer.target().matches(out.dimensions()));
        assert_eq!(out.dimensions(), (60, 100));
    }
}
