//! Store trait abstractions
//!
//! The upload coordinator and the conversion pipeline only see these traits, so they run
//! the same way against PostgreSQL and against the in-memory store.

use async_trait::async_trait;
use intake_core::models::{ConvertedFile, FileKind, FileRecord, NewFileRecord};
use intake_core::AppError;
use uuid::Uuid;

/// Persistence operations on file records.
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    /// Reserve the next slot of `directory`.
    ///
    /// Reservations for the same directory are serialized: a second caller waits until
    /// the first lease is committed or released, so committed slots strictly increase.
    async fn reserve_slot(&self, directory: &str) -> Result<Box<dyn SlotLease>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    /// Number of committed records in `directory`.
    async fn count_in_directory(&self, directory: &str) -> Result<i64, AppError>;

    /// Set the kind if it is still unset and return the stored kind.
    async fn assign_kind(&self, id: Uuid, kind: FileKind) -> Result<FileKind, AppError>;

    /// Store a successful conversion and clear any previous error.
    async fn mark_converted(&self, id: Uuid, converted: &ConvertedFile) -> Result<(), AppError>;

    /// Store a failed conversion; the normalized path and metadata are cleared.
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// A reserved slot inside a directory, holding the directory's serialization point.
///
/// Dropping a lease without committing releases it.
#[async_trait]
pub trait SlotLease: Send {
    fn directory(&self) -> &str;

    fn slot(&self) -> i64;

    /// Insert the record for this slot and release the directory.
    async fn commit(self: Box<Self>, record: NewFileRecord) -> Result<FileRecord, AppError>;

    /// Give the slot back without writing anything.
    async fn release(self: Box<Self>) -> Result<(), AppError>;
}
