//! Axis-aligned bounding boxes of detected glyphs

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Glyph extent in pixel coordinates of the binarized image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tightest box covering every point; `None` for an empty slice.
    /// Negative coordinates are clamped to zero.
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        Some(Self::new(
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1).max(1) as u32,
            (max_y - min_y + 1).max(1) as u32,
        ))
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the box lies entirely inside a `width x height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Shrink to the part overlapping a `width x height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self::new(
            x,
            y,
            self.right().min(width) - x,
            self.bottom().min(height) - y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let points = [
            Point::new(10, 12),
            Point::new(29, 12),
            Point::new(29, 40),
            Point::new(10, 40),
        ];
        let bbox = BBox::from_points(&points).unwrap();
        assert_eq!(bbox, BBox::new(10, 12, 20, 29));
        assert!(bbox.fits_within(30, 41));
        assert!(!bbox.fits_within(29, 41));
    }

    #[test]
    fn test_from_no_points() {
        assert_eq!(BBox::from_points(&[]), None);
    }

    #[test]
    fn test_clamp_to() {
        let bbox = BBox::new(5, 5, 20, 20).clamp_to(15, 30);
        assert_eq!(bbox, BBox::new(5, 5, 10, 20));
    }
}
