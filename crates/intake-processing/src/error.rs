use intake_storage::StorageError;
use thiserror::Error;

/// Why a conversion attempt failed. The message is what ends up on the record.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("file has not been classified")]
    Unclassified,

    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("unsupported document format: {0}")]
    UnsupportedDocumentFormat(String),

    #[error("failed to read {path}: {source}")]
    ReadOriginal {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("conversion task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ConversionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConversionError::Task(err.to_string())
    }
}

impl From<ConversionError> for intake_core::AppError {
    fn from(err: ConversionError) -> Self {
        intake_core::AppError::Conversion(err.to_string())
    }
}
