//! Upload coordinator: ensure dir → reserve slot → stream to disk → commit record.
//!
//! A record exists only when its file is on disk, and a file stays on disk only when its
//! record was committed. Every failure path undoes whatever the earlier steps did.

use chrono::NaiveDate;
use intake_core::constants::DEFAULT_CONTENT_TYPE;
use intake_core::models::{FileRecord, NewFileRecord};
use intake_core::naming::{base_name, date_bucket, join_key, slot_file_name};
use intake_core::AppError;
use intake_db::FileRecordStore;
use intake_storage::traits::StorageReader;
use intake_storage::Storage;
use std::sync::Arc;

use super::types::IncomingFile;

#[derive(Clone)]
pub struct UploadCoordinator {
    store: Arc<dyn FileRecordStore>,
    storage: Arc<dyn Storage>,
    original_dir: String,
}

impl UploadCoordinator {
    pub fn new(
        store: Arc<dyn FileRecordStore>,
        storage: Arc<dyn Storage>,
        original_dir: impl Into<String>,
    ) -> Self {
        Self {
            store,
            storage,
            original_dir: original_dir.into(),
        }
    }

    /// Destination directory for uploads received on `date`.
    pub fn directory_for(&self, date: NaiveDate) -> String {
        join_key(&self.original_dir, &date_bucket(date))
    }

    /// Store one file under the next free slot of `directory`.
    #[tracing::instrument(skip(self, file, reader), fields(filename = %file.filename))]
    pub async fn store(
        &self,
        directory: &str,
        file: &IncomingFile,
        reader: StorageReader<'_>,
    ) -> Result<FileRecord, AppError> {
        let original_filename = base_name(file.filename.trim());
        if original_filename.is_empty() {
            return Err(AppError::InvalidInput("empty filename".to_string()));
        }

        self.storage.ensure_dir(directory).await?;

        let lease = self.store.reserve_slot(directory).await?;
        let file_name = slot_file_name(lease.slot(), original_filename);
        let key = join_key(directory, &file_name);

        let written = match self.storage.write_stream(&key, reader).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(release_err) = lease.release().await {
                    tracing::warn!(error = %release_err, "Failed to release slot");
                }
                return Err(e.into());
            }
        };

        if let Some(declared) = file.declared_size {
            if declared != written {
                tracing::debug!(declared, written, key = %key, "Declared size differs from bytes received");
            }
        }

        let content_type = file
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let new_record = NewFileRecord {
            original_filename: original_filename.to_string(),
            content_type,
            file_name,
            original_file_path: key.clone(),
            size: written as i64,
        };

        match lease.commit(new_record).await {
            Ok(record) => {
                tracing::info!(
                    record_id = %record.id,
                    key = %key,
                    size_bytes = written,
                    "Upload stored"
                );
                Ok(record)
            }
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&key).await {
                    tracing::error!(
                        error = %cleanup_err,
                        key = %key,
                        "Failed to remove file after insert failure"
                    );
                }
                Err(e)
            }
        }
    }
}
