//! Document normalization to Markdown.

pub mod markdown;
pub mod normalizer;

pub use normalizer::DocumentNormalizer;
