//! Random chaining of several operators into one combined variant

use super::{Category, VariantSet};
use crate::augment::transforms::TransformLibrary;
use image::GrayImage;
use rand::Rng;

/// Enabled composite categories, always held in `Category::COMPOSITE_ORDER`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorySet {
    enabled: Vec<Category>,
}

impl CategorySet {
    /// Nothing enabled: the composite passes its input through
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            enabled: Category::COMPOSITE_ORDER.to_vec(),
        }
    }

    /// Categories outside the composite order (rotation) are dropped and
    /// duplicates collapse; input order does not matter.
    pub fn from_categories<I: IntoIterator<Item = Category>>(categories: I) -> Self {
        let wanted: Vec<Category> = categories.into_iter().collect();
        Self {
            enabled: Category::COMPOSITE_ORDER
                .iter()
                .copied()
                .filter(|c| wanted.contains(c))
                .collect(),
        }
    }

    /// Bit `i` enables `Category::COMPOSITE_ORDER[i]`; higher bits are ignored.
    pub fn from_mask(mask: u8) -> Self {
        Self {
            enabled: Category::COMPOSITE_ORDER
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect(),
        }
    }

    /// All 2^6 on/off combinations
    pub fn all_combinations() -> impl Iterator<Item = CategorySet> {
        (0u8..(1 << Category::COMPOSITE_ORDER.len())).map(Self::from_mask)
    }

    /// One fair coin flip per composite category
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            enabled: Category::COMPOSITE_ORDER
                .iter()
                .copied()
                .filter(|_| rng.gen_bool(0.5))
                .collect(),
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.enabled.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.enabled.iter()
    }
}

/// Builds combined variants by chaining library operators
pub struct CompositeAugmentor<'a> {
    library: &'a TransformLibrary,
}

impl<'a> CompositeAugmentor<'a> {
    pub fn new(library: &'a TransformLibrary) -> Self {
        Self { library }
    }

    /// Apply each enabled category once, in declared order, each step
    /// consuming the previous step's output.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        image: &GrayImage,
        enabled: &CategorySet,
        rng: &mut R,
    ) -> GrayImage {
        enabled.iter().fold(image.clone(), |working, &category| {
            self.library.apply_once(category, &working, rng)
        })
    }

    /// One combined variant with freshly drawn flips
    pub fn variant<R: Rng + ?Sized>(&self, image: &GrayImage, rng: &mut R) -> GrayImage {
        let enabled = CategorySet::draw(rng);
        self.apply(image, &enabled, rng)
    }

    pub fn variants<R: Rng + ?Sized>(&self, image: &GrayImage, count: usize, rng: &mut R) -> VariantSet {
        (0..count).map(|_| self.variant(image, rng)).collect()
    }
}
