//! Augmentation engine: operators, composition and dataset generation

pub mod composite;
pub mod dataset;
pub mod transforms;

pub use composite::{CategorySet, CompositeAugmentor};
pub use dataset::{BuildSummary, DatasetBuilder, SkippedSource};
pub use transforms::{Transform, TransformLibrary};

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Ordered randomized outputs of one operator for one source image
pub type VariantSet = Vec<GrayImage>;

/// Augmentation operator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Pad,
    Translate,
    Rotate,
    Blur,
    VerticalStretch,
    HorizontalStretch,
    Zoom,
}

impl Category {
    /// Single-operator categories in dataset output order
    pub const ALL: [Category; 7] = [
        Category::Pad,
        Category::Translate,
        Category::Rotate,
        Category::Blur,
        Category::VerticalStretch,
        Category::HorizontalStretch,
        Category::Zoom,
    ];

    /// Categories the composite augmentor chains, in application order.
    /// Rotation never takes part.
    pub const COMPOSITE_ORDER: [Category; 6] = [
        Category::Pad,
        Category::Translate,
        Category::Blur,
        Category::VerticalStretch,
        Category::HorizontalStretch,
        Category::Zoom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Pad => "pad",
            Category::Translate => "translate",
            Category::Rotate => "rotate",
            Category::Blur => "blur",
            Category::VerticalStretch => "vstretch",
            Category::HorizontalStretch => "hstretch",
            Category::Zoom => "zoom",
        }
    }
}
