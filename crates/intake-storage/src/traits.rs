//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use intake_core::AppError;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Boxed reader handed to streamed writes.
pub type StorageReader<'a> = Pin<Box<dyn AsyncRead + Send + 'a>>;

/// Storage abstraction trait
///
/// Upload intake writes originals through it and the conversion pipeline reads originals
/// and writes normalized outputs through it, so neither depends on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the directory for `storage_key` if missing. Idempotent.
    async fn ensure_dir(&self, storage_key: &str) -> StorageResult<()>;

    /// Copy `reader` to `storage_key` until EOF and return the number of bytes written.
    ///
    /// A failed copy leaves nothing behind at `storage_key`.
    async fn write_stream(
        &self,
        storage_key: &str,
        reader: StorageReader<'_>,
    ) -> StorageResult<u64>;

    /// Write `data` to `storage_key`, replacing any previous content.
    async fn write(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<u64>;

    /// Read a whole file by its storage key
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Missing files are not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of a file, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Verify the backend is reachable and writable.
    async fn health_check(&self) -> StorageResult<()>;
}
