//! Bridge between normalized images and an external classifier

pub mod adapter;

pub use adapter::{top_prediction, ClassificationAdapter, InputTensor};
