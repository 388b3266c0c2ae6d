use intake_core::models::ConversionOutcome;
use intake_core::AppError;
use intake_db::FileRecordStore;
use uuid::Uuid;

/// Write `outcome` onto the record. The latest outcome always replaces earlier ones.
pub async fn apply_outcome(
    store: &dyn FileRecordStore,
    record_id: Uuid,
    outcome: &ConversionOutcome,
) -> Result<(), AppError> {
    match outcome {
        ConversionOutcome::Converted(converted) => {
            store.mark_converted(record_id, converted).await
        }
        ConversionOutcome::Failed { reason } => store.mark_failed(record_id, reason).await,
    }
}
