//! Intake Processing Library
//!
//! Type classification, the image and document normalizers, the conversion pipeline that
//! writes their outcome back onto a record, and the upload coordinator.

pub mod classifier;
pub mod document;
pub mod error;
pub mod image;
pub mod normalizer;
pub mod outcome;
pub mod pipeline;
pub mod upload;

pub use crate::document::DocumentNormalizer;
pub use crate::image::ImageNormalizer;
pub use classifier::classify;
pub use error::ConversionError;
pub use normalizer::{Normalizer, Normalizers, OutputLayout};
pub use outcome::apply_outcome;
pub use pipeline::ConversionPipeline;
pub use upload::UploadCoordinator;
