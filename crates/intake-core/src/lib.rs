//! Intake Core Library
//!
//! This crate provides the domain models, error types, configuration and naming rules
//! shared by every Intake component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ConversionOutcome, ConvertedFile, DocumentMetadata, FileKind, FileRecord,
    FileRecordResponse, ImageMetadata, NewFileRecord, NormalizedMetadata,
};
