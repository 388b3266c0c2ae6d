//! Conversion dispatcher: classify synchronously, convert in the background.

use std::sync::Arc;

use intake_core::models::{FileKind, FileRecord};
use intake_core::AppError;
use intake_db::FileRecordStore;
use intake_processing::classify;
use uuid::Uuid;

use crate::queue::ConversionQueue;

#[derive(Clone)]
pub struct ConversionDispatcher {
    store: Arc<dyn FileRecordStore>,
    queue: ConversionQueue,
}

impl ConversionDispatcher {
    pub fn new(store: Arc<dyn FileRecordStore>, queue: ConversionQueue) -> Self {
        Self { store, queue }
    }

    pub fn queue(&self) -> &ConversionQueue {
        &self.queue
    }

    /// Classify `record`, store its kind and queue it for conversion.
    ///
    /// Unsupported types are rejected before anything is scheduled. A record that was
    /// classified before keeps its first kind.
    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn dispatch(&self, record: &FileRecord) -> Result<FileKind, AppError> {
        let kind = classify(&record.original_filename)?;
        let kind = self.store.assign_kind(record.id, kind).await?;

        self.queue.submit(record.id).await?;

        tracing::info!(file_kind = %kind, "Conversion scheduled");
        Ok(kind)
    }

    /// Look `record_id` up and dispatch it again. The new outcome replaces the old one.
    pub async fn redispatch(&self, record_id: Uuid) -> Result<FileRecord, AppError> {
        let record = self
            .store
            .get(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File record {} not found", record_id)))?;

        let kind = self.dispatch(&record).await?;
        Ok(FileRecord {
            file_kind: Some(kind),
            ..record
        })
    }
}
