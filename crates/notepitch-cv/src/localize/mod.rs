//! Inference-time glyph isolation and canonical normalization

pub mod canvas;
pub mod localizer;

pub use canvas::{CanvasNormalizer, CenteredGlyph};
pub use localizer::{Binarization, Localization, NoteLocalizer};
