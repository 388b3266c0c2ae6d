//! Conversion handler trait
//!
//! The worker pool only knows record ids. It calls into a `ConversionHandler` to do the
//! actual work; the processing pipeline is the production implementation.

use async_trait::async_trait;
use intake_core::models::ConversionOutcome;
use intake_core::AppError;
use intake_processing::{apply_outcome, ConversionPipeline};
use uuid::Uuid;

#[async_trait]
pub trait ConversionHandler: Send + Sync {
    /// Convert one record and persist the outcome on it.
    async fn convert(&self, record_id: Uuid) -> Result<ConversionOutcome, AppError>;

    /// Record a failure that happened before conversion could start.
    async fn record_failure(&self, record_id: Uuid, reason: &str) -> Result<(), AppError>;
}

#[async_trait]
impl ConversionHandler for ConversionPipeline {
    async fn convert(&self, record_id: Uuid) -> Result<ConversionOutcome, AppError> {
        self.run(record_id).await
    }

    async fn record_failure(&self, record_id: Uuid, reason: &str) -> Result<(), AppError> {
        apply_outcome(
            self.store().as_ref(),
            record_id,
            &ConversionOutcome::failed(reason),
        )
        .await
    }
}
