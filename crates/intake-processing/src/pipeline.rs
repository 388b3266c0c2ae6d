//! Conversion pipeline: load record → normalize by kind → persist outcome.

use intake_core::models::{ConversionOutcome, ConvertedFile, FileRecord};
use intake_core::AppError;
use intake_db::FileRecordStore;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ConversionError;
use crate::normalizer::Normalizers;
use crate::outcome::apply_outcome;

#[derive(Clone)]
pub struct ConversionPipeline {
    store: Arc<dyn FileRecordStore>,
    normalizers: Normalizers,
}

impl ConversionPipeline {
    pub fn new(store: Arc<dyn FileRecordStore>, normalizers: Normalizers) -> Self {
        Self { store, normalizers }
    }

    pub fn store(&self) -> &Arc<dyn FileRecordStore> {
        &self.store
    }

    /// Convert one record and persist the result.
    ///
    /// Conversion failures are recorded on the record and returned as a `Failed`
    /// outcome. Only a missing record or a failed write-back is an `Err`.
    #[tracing::instrument(skip(self), fields(record_id = %record_id))]
    pub async fn run(&self, record_id: Uuid) -> Result<ConversionOutcome, AppError> {
        let record = self
            .store
            .get(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File record {} not found", record_id)))?;

        let start = std::time::Instant::now();
        let outcome = match self.normalize(&record).await {
            Ok(converted) => ConversionOutcome::Converted(converted),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    original = %record.original_file_path,
                    "Conversion failed"
                );
                ConversionOutcome::failed(e.to_string())
            }
        };

        apply_outcome(self.store.as_ref(), record_id, &outcome).await?;

        tracing::info!(
            converted = outcome.is_converted(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Conversion finished"
        );

        Ok(outcome)
    }

    async fn normalize(&self, record: &FileRecord) -> Result<ConvertedFile, ConversionError> {
        let kind = record.file_kind.ok_or(ConversionError::Unclassified)?;
        self.normalizers.for_kind(kind).normalize(record).await
    }
}
