//! Image normalization to JPEG.

pub mod normalizer;

pub use normalizer::{transcode_to_jpeg, ImageNormalizer};
