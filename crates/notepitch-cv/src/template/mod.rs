//! Reference templates: one clean glyph per pitch

pub mod classifier;
pub mod loader;

pub use classifier::TemplateClassifier;
pub use loader::TemplateLoader;

use image::GrayImage;
use notepitch_core::{CanonicalSize, Pitch};
use std::collections::BTreeMap;

/// Reference glyph prepared for comparison
#[derive(Debug, Clone)]
pub struct Template {
    pub pitch: Pitch,
    /// Binarized and resized to the set's canonical size
    pub image: GrayImage,
}

impl Template {
    pub fn new(pitch: Pitch, image: GrayImage) -> Self {
        Self { pitch, image }
    }
}

/// Templates keyed by pitch, all sharing one canonical size
#[derive(Debug, Clone)]
pub struct TemplateSet {
    size: CanonicalSize,
    templates: BTreeMap<Pitch, Template>,
}

impl TemplateSet {
    pub fn new(size: CanonicalSize) -> Self {
        Self {
            size,
            templates: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> CanonicalSize {
        self.size
    }

    /// Replaces any template already held for the same pitch
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.pitch, template);
    }

    pub fn get(&self, pitch: Pitch) -> Option<&Template> {
        self.templates.get(&pitch)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}
