//! Geometric and photometric operators used to build training variants.
//!
//! Every operator is pure: it draws its parameters from an injected random
//! source, never mutates the input, and always returns an image with the
//! input's exact dimensions.

use super::{Category, VariantSet};
use crate::config::AugmentConfig;
use crate::error::Result;
use crate::utils::image::{ImageUtils, WHITE};
use image::{imageops, GrayImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate, warp, Interpolation, Projection};
use rand::Rng;
use std::fmt::Debug;

/// A randomized single-channel image operator
pub trait Transform {
    type Params: Debug + Clone + PartialEq;

    /// Draw one parameter set from the operator's configured ranges
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Params;

    fn apply(&self, image: &GrayImage, params: &Self::Params) -> GrayImage;

    /// `count` independent draws applied to the same source
    fn variants<R: Rng + ?Sized>(&self, image: &GrayImage, count: usize, rng: &mut R) -> VariantSet {
        (0..count)
            .map(|_| {
                let params = self.sample(rng);
                self.apply(image, &params)
            })
            .collect()
    }
}

/// Replicate-border padding, resized back to the source size
#[derive(Debug, Clone)]
pub struct Pad {
    /// Inclusive lower bound for each side
    pub min: u32,
    /// Exclusive upper bound for each side
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadParams {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Transform for Pad {
    type Params = PadParams;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PadParams {
        PadParams {
            top: rng.gen_range(self.min..self.max),
            bottom: rng.gen_range(self.min..self.max),
            left: rng.gen_range(self.min..self.max),
            right: rng.gen_range(self.min..self.max),
        }
    }

    fn apply(&self, image: &GrayImage, p: &PadParams) -> GrayImage {
        let (width, height) = image.dimensions();
        let padded = ImageUtils::pad_replicate(image, p.top, p.bottom, p.left, p.right);
        ImageUtils::resize_linear(&padded, width, height)
    }
}

/// Integer pixel shift; exposed area is white, shifted-out content is lost
#[derive(Debug, Clone)]
pub struct Translate {
    pub range: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateParams {
    pub tx: i32,
    pub ty: i32,
}

impl Transform for Translate {
    type Params = TranslateParams;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TranslateParams {
        let (lo, hi) = self.range;
        TranslateParams {
            tx: rng.gen_range(lo..=hi),
            ty: rng.gen_range(lo..=hi),
        }
    }

    fn apply(&self, image: &GrayImage, p: &TranslateParams) -> GrayImage {
        let shift = Projection::translate(p.tx as f32, p.ty as f32);
        warp(image, &shift, Interpolation::Nearest, WHITE)
    }
}

/// Rotation about the image center by a small angle in degrees
#[derive(Debug, Clone)]
pub struct Rotate {
    pub range: (f32, f32),
}

impl Transform for Rotate {
    type Params = f32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.range.0..=self.range.1)
    }

    fn apply(&self, image: &GrayImage, degrees: &f32) -> GrayImage {
        let (width, height) = image.dimensions();
        // bilinear sampling needs both neighbours in bounds, so the last
        // row and column are only reachable through a white frame
        let mut framed = ImageUtils::white_canvas(width + 2, height + 2);
        imageops::replace(&mut framed, image, 1, 1);
        let center = ((width / 2 + 1) as f32, (height / 2 + 1) as f32);
        // positive angles turn counter-clockwise; imageproc turns clockwise
        let rotated = rotate(
            &framed,
            center,
            -degrees.to_radians(),
            Interpolation::Bilinear,
            WHITE,
        );
        imageops::crop_imm(&rotated, 1, 1, width, height).to_image()
    }
}

/// Gaussian blur; `sigma` is derived from the configured kernel size and
/// imageproc picks the kernel extent from it
#[derive(Debug, Clone)]
pub struct Blur {
    pub sigma: f32,
}

impl Transform for Blur {
    type Params = ();

    fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) {}

    fn apply(&self, image: &GrayImage, _: &()) -> GrayImage {
        gaussian_blur_f32(image, self.sigma)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Scale one axis, then center on a white canvas (shrink) or center-crop
/// (grow) back to the source size
#[derive(Debug, Clone)]
pub struct Stretch {
    pub axis: Axis,
    pub range: (f32, f32),
}

impl Transform for Stretch {
    type Params = f32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.range.0..=self.range.1)
    }

    fn apply(&self, image: &GrayImage, factor: &f32) -> GrayImage {
        let factor = *factor;
        let (width, height) = image.dimensions();
        let (out_w, out_h) = match self.axis {
            Axis::Vertical => (width, scaled_len(height, factor)),
            Axis::Horizontal => (scaled_len(width, factor), height),
        };
        let stretched = ImageUtils::resize_linear(image, out_w, out_h);

        if out_w <= width && out_h <= height {
            let mut canvas = ImageUtils::white_canvas(width, height);
            let x_offset = (width - out_w) / 2;
            let y_offset = (height - out_h) / 2;
            imageops::replace(&mut canvas, &stretched, x_offset as i64, y_offset as i64);
            canvas
        } else {
            let start_x = (out_w - width) / 2;
            let start_y = (out_h - height) / 2;
            imageops::crop_imm(&stretched, start_x, start_y, width, height).to_image()
        }
    }
}

/// Centered crop of `(h / factor, w / factor)` resized back up
#[derive(Debug, Clone)]
pub struct Zoom {
    pub range: (f32, f32),
}

impl Transform for Zoom {
    type Params = f32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.range.0..=self.range.1)
    }

    fn apply(&self, image: &GrayImage, factor: &f32) -> GrayImage {
        let (width, height) = image.dimensions();
        let crop_w = ((width as f32 / factor) as u32).clamp(1, width.max(1));
        let crop_h = ((height as f32 / factor) as u32).clamp(1, height.max(1));
        let start_x = (width - crop_w) / 2;
        let start_y = (height - crop_h) / 2;
        let cropped = imageops::crop_imm(image, start_x, start_y, crop_w, crop_h).to_image();
        ImageUtils::resize_linear(&cropped, width, height)
    }
}

fn scaled_len(len: u32, factor: f32) -> u32 {
    ((len as f32 * factor) as u32).max(1)
}

/// The seven operators, configured once per run
#[derive(Debug, Clone)]
pub struct TransformLibrary {
    pub pad: Pad,
    pub translate: Translate,
    pub rotate: Rotate,
    pub blur: Blur,
    pub vstretch: Stretch,
    pub hstretch: Stretch,
    pub zoom: Zoom,
}

impl TransformLibrary {
    /// Validates the ranges first; a degenerate range is a startup error.
    pub fn from_config(config: &AugmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &AugmentConfig) -> Self {
        Self {
            pad: Pad {
                min: config.pad_min,
                max: config.max_pad,
            },
            translate: Translate {
                range: config.translate_range,
            },
            rotate: Rotate {
                range: config.rotate_range,
            },
            blur: Blur {
                sigma: config.blur_sigma(),
            },
            vstretch: Stretch {
                axis: Axis::Vertical,
                range: config.stretch_range,
            },
            hstretch: Stretch {
                axis: Axis::Horizontal,
                range: config.stretch_range,
            },
            zoom: Zoom {
                range: config.zoom_range,
            },
        }
    }

    /// Variant set of `count` images for one category
    pub fn variants<R: Rng + ?Sized>(
        &self,
        category: Category,
        image: &GrayImage,
        count: usize,
        rng: &mut R,
    ) -> VariantSet {
        match category {
            Category::Pad => self.pad.variants(image, count, rng),
            Category::Translate => self.translate.variants(image, count, rng),
            Category::Rotate => self.rotate.variants(image, count, rng),
            Category::Blur => self.blur.variants(image, count, rng),
            Category::VerticalStretch => self.vstretch.variants(image, count, rng),
            Category::HorizontalStretch => self.hstretch.variants(image, count, rng),
            Category::Zoom => self.zoom.variants(image, count, rng),
        }
    }

    /// One random draw of one category
    pub fn apply_once<R: Rng + ?Sized>(
        &self,
        category: Category,
        image: &GrayImage,
        rng: &mut R,
    ) -> GrayImage {
        self.variants(category, image, 1, rng)
            .pop()
            .unwrap_or_else(|| image.clone())
    }
}

impl Default for TransformLibrary {
    fn default() -> Self {
        Self::build(&AugmentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// White image with a dark filled rectangle
    fn glyph(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if x >= width / 4 && x < 3 * width / 4 && y >= height / 3 && y < 2 * height / 3 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_every_operator_preserves_dimensions() {
        let library = TransformLibrary::default();
        let mut rng = StdRng::seed_from_u64(7);
        for (w, h) in [(60, 100), (33, 17), (1, 1), (5, 80)] {
            let image = glyph(w, h);
            for category in Category::ALL {
                for variant in library.variants(category, &image, 8, &mut rng) {
                    assert_eq!(variant.dimensions(), (w, h), "{category:?} on {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn test_variant_count_matches_request() {
        let library = TransformLibrary::default();
        let mut rng = StdRng::seed_from_u64(1);
        let image = glyph(20, 20);
        for category in Category::ALL {
            assert_eq!(library.variants(category, &image, 3, &mut rng).len(), 3);
            assert!(library.variants(category, &image, 0, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_drawn_parameters_within_bounds() {
        let library = TransformLibrary::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let p = library.pad.sample(&mut rng);
            for side in [p.top, p.bottom, p.left, p.right] {
                assert!((50..400).contains(&side));
            }
            let t = library.translate.sample(&mut rng);
            assert!((-20..=20).contains(&t.tx) && (-20..=20).contains(&t.ty));
            let angle = library.rotate.sample(&mut rng);
            assert!((-5.0..=5.0).contains(&angle));
            let v = library.vstretch.sample(&mut rng);
            let h = library.hstretch.sample(&mut rng);
            assert!((0.5..=1.5).contains(&v) && (0.5..=1.5).contains(&h));
            let z = library.zoom.sample(&mut rng);
            assert!((1.1..=2.0).contains(&z) && z > 1.0);
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let library = TransformLibrary::default();
        let image = glyph(40, 40);
        let a = library.variants(Category::Rotate, &image, 2, &mut StdRng::seed_from_u64(9));
        let b = library.variants(Category::Rotate, &image, 2, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_translate_shifts_and_fills_white() {
        let mut image = ImageUtils::white_canvas(30, 30);
        image.put_pixel(10, 10, Luma([0]));
        let shifted = Translate { range: (-20, 20) }.apply(&image, &TranslateParams { tx: 3, ty: -2 });
        assert_eq!(shifted.get_pixel(13, 8)[0], 0);
        assert_eq!(shifted.pixels().filter(|p| p[0] == 0).count(), 1);
    }

    #[test]
    fn test_translate_clips_instead_of_wrapping() {
        let image = GrayImage::from_pixel(10, 10, Luma([0]));
        let shifted = Translate { range: (-20, 20) }.apply(&image, &TranslateParams { tx: 4, ty: 0 });
        for y in 0..10 {
            for x in 0..4 {
                assert_eq!(shifted.get_pixel(x, y)[0], 255);
            }
            assert_eq!(shifted.get_pixel(5, y)[0], 0);
        }
    }

    #[test]
    fn test_blur_is_deterministic() {
        let library = TransformLibrary::default();
        let image = glyph(50, 50);
        let mut rng = StdRng::seed_from_u64(3);
        let set = library.variants(Category::Blur, &image, 3, &mut rng);
        assert_eq!(set[0], set[1]);
        assert_eq!(set[1], set[2]);
        assert_ne!(set[0], image);
    }

    #[test]
    fn test_vertical_compress_centers_on_white() {
        let image = GrayImage::from_pixel(20, 40, Luma([0]));
        let stretch = Stretch {
            axis: Axis::Vertical,
            range: (0.5, 1.5),
        };
        let out = stretch.apply(&image, &0.5);
        assert_eq!(out.dimensions(), (20, 40));
        assert_eq!(out.get_pixel(10, 0)[0], 255);
        assert_eq!(out.get_pixel(10, 9)[0], 255);
        assert_eq!(out.get_pixel(10, 20)[0], 0);
        assert_eq!(out.get_pixel(10, 35)[0], 255);
    }

    #[test]
    fn test_horizontal_grow_center_crops() {
        let image = GrayImage::from_fn(40, 20, |x, _| if x < 20 { Luma([0]) } else { Luma([255]) });
        let stretch = Stretch {
            axis: Axis::Horizontal,
            range: (0.5, 1.5),
        };
        let out = stretch.apply(&image, &1.5);
        assert_eq!(out.dimensions(), (40, 20));
        // crop starts 10px into the 60px-wide stretch, so the dark half
        // now covers the first 20 columns
        assert_eq!(out.get_pixel(5, 10)[0], 0);
        assert_eq!(out.get_pixel(30, 10)[0], 255);
    }

    #[test]
    fn test_zoom_magnifies_center() {
        let mut image = ImageUtils::white_canvas(100, 100);
        for y in 45..55 {
            for x in 45..55 {
                image.put_pixel(x, y, Luma([0]));
            }
        }
        let zoomed = Zoom { range: (1.1, 2.0) }.apply(&image, &2.0);
        let dark_before = image.pixels().filter(|p| p[0] < 128).count();
        let dark_after = zoomed.pixels().filter(|p| p[0] < 128).count();
        assert!(dark_after > dark_before * 3);
        assert_eq!(zoomed.get_pixel(50, 50)[0], 0);
    }

    #[test]
    fn test_rotate_keeps_white_background() {
        let image = glyph(60, 100);
        let rotated = Rotate { range: (-5.0, 5.0) }.apply(&image, &5.0);
        assert_eq!(rotated.get_pixel(0, 0)[0], 255);
        assert!(rotated.get_pixel(30, 50)[0] < 128);
    }

    #[test]
    fn test_identity_parameters_keep_every_pixel() {
        let dark = GrayImage::from_pixel(20, 40, Luma([0]));
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let stretch = Stretch {
                axis,
                range: (0.5, 1.5),
            };
            assert_eq!(stretch.apply(&dark, &1.0), dark, "{axis:?}");
        }
        let rotate = Rotate { range: (-5.0, 5.0) };
        assert_eq!(rotate.apply(&dark, &0.0), dark);

        let image = glyph(60, 100);
        assert_eq!(rotate.apply(&image, &0.0), image);
        let shift = TranslateParams { tx: 0, ty: 0 };
        assert_eq!(Translate { range: (-20, 20) }.apply(&image, &shift), image);
    }

    #[test]
    fn test_small_rotation_keeps_far_edges() {
        let dark = GrayImage::from_pixel(60, 100, Luma([0]));
        let rotated = Rotate { range: (-5.0, 5.0) }.apply(&dark, &1.0);
        // rotation about the center only exposes the corners
        assert_eq!(rotated.get_pixel(30, 99)[0], 0);
        assert_eq!(rotated.get_pixel(59, 50)[0], 0);
    }

    #[test]
    fn test_weakest_zoom_keeps_uniform_image() {
        let dark = GrayImage::from_pixel(60, 100, Luma([0]));
        let zoom = Zoom { range: (1.1, 2.0) };
        assert_eq!(zoom.apply(&dark, &1.1), dark);
        let zoomed = zoom.apply(&glyph(60, 100), &1.1);
        assert_eq!(zoomed.get_pixel(0, 0)[0], 255);
        assert_eq!(zoomed.get_pixel(59, 99)[0], 255);
        assert_eq!(zoomed.get_pixel(30, 50)[0], 0);
    }

    #[test]
    fn test_degenerate_config_rejected() {
        let config = AugmentConfig {
            max_pad: 10,
            ..Default::default()
        };
        assert!(TransformLibrary::from_config(&config).is_err());
    }
}
