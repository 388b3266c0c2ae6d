//! In-memory file record store.
//!
//! Same contract as the PostgreSQL repository. A per-directory async mutex stands in for
//! the row lock and is held by the lease until it commits or is dropped.

use async_trait::async_trait;
use chrono::Utc;
use intake_core::models::{ConvertedFile, FileKind, FileRecord, NewFileRecord};
use intake_core::naming::next_slot;
use intake_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::store_traits::{FileRecordStore, SlotLease};

#[derive(Default)]
struct Shared {
    records: Mutex<HashMap<Uuid, FileRecord>>,
    directory_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    fail_inserts: AtomicBool,
}

impl Shared {
    fn records(&self) -> MutexGuard<'_, HashMap<Uuid, FileRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn directory_lock(&self, directory: &str) -> Arc<AsyncMutex<()>> {
        self.directory_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(directory.to_string())
            .or_default()
            .clone()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryFileRecordStore {
    shared: Arc<Shared>,
}

impl InMemoryFileRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail, as a rejected insert would.
    pub fn fail_inserts(&self, fail: bool) {
        self.shared.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = self.shared.records().values().cloned().collect();
        records.sort_by(|a, b| (&a.directory, a.slot).cmp(&(&b.directory, b.slot)));
        records
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<FileRecord, AppError>
    where
        F: FnOnce(&mut FileRecord),
    {
        let mut records = self.shared.records();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("File record {} not found", id)))?;
        apply(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[async_trait]
impl FileRecordStore for InMemoryFileRecordStore {
    async fn reserve_slot(&self, directory: &str) -> Result<Box<dyn SlotLease>, AppError> {
        let guard = self.shared.directory_lock(directory).lock_owned().await;

        let highest = self
            .shared
            .records()
            .values()
            .filter(|r| r.directory == directory)
            .map(|r| r.slot)
            .max();

        Ok(Box::new(MemorySlotLease {
            shared: self.shared.clone(),
            directory: directory.to_string(),
            slot: next_slot(highest),
            _guard: guard,
        }))
    }

    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self.shared.records().get(&id).cloned())
    }

    async fn count_in_directory(&self, directory: &str) -> Result<i64, AppError> {
        let count = self
            .shared
            .records()
            .values()
            .filter(|r| r.directory == directory)
            .count();
        Ok(count as i64)
    }

    async fn assign_kind(&self, id: Uuid, kind: FileKind) -> Result<FileKind, AppError> {
        let record = self.update(id, |r| {
            r.file_kind.get_or_insert(kind);
        })?;
        Ok(record.file_kind.unwrap_or(kind))
    }

    async fn mark_converted(&self, id: Uuid, converted: &ConvertedFile) -> Result<(), AppError> {
        self.update(id, |r| {
            r.file_path = Some(converted.file_path.clone());
            r.file_name = converted.file_name.clone();
            r.size = converted.size;
            r.metadata = Some(converted.metadata.to_json());
            r.error_message = None;
        })?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), AppError> {
        self.update(id, |r| {
            r.file_path = None;
            r.metadata = None;
            r.error_message = Some(reason.to_string());
        })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

struct MemorySlotLease {
    shared: Arc<Shared>,
    directory: String,
    slot: i64,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl SlotLease for MemorySlotLease {
    fn directory(&self) -> &str {
        &self.directory
    }

    fn slot(&self) -> i64 {
        self.slot
    }

    async fn commit(self: Box<Self>, record: NewFileRecord) -> Result<FileRecord, AppError> {
        if self.shared.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!(
                "insert rejected for {}",
                record.original_file_path
            )));
        }

        let mut records = self.shared.records();
        if records
            .values()
            .any(|r| r.original_file_path == record.original_file_path)
        {
            return Err(AppError::Internal(format!(
                "duplicate original path {}",
                record.original_file_path
            )));
        }

        let now = Utc::now();
        let inserted = FileRecord {
            id: Uuid::new_v4(),
            original_filename: record.original_filename,
            content_type: record.content_type,
            file_name: record.file_name,
            directory: self.directory.clone(),
            slot: self.slot,
            original_file_path: record.original_file_path,
            file_path: None,
            size: record.size,
            file_kind: None,
            metadata: None,
            caption: None,
            tag: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };
        records.insert(inserted.id, inserted.clone());
        Ok(inserted)
    }

    async fn release(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}
