//! Service wiring and background tasks

use crate::state::AppState;
use intake_core::Config;
use intake_db::FileRecordStore;
use intake_storage::Storage;
use intake_worker::DeadLetterReceiver;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Build the application state and start draining its dead letters.
pub fn initialize_services(
    config: Config,
    store: Arc<dyn FileRecordStore>,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let (state, dead_letters) = AppState::new(config, store, storage);
    spawn_dead_letter_logger(dead_letters);

    tracing::info!(
        max_workers = state.queue().config().max_workers,
        capacity = state.queue().config().capacity,
        "Conversion queue started"
    );
    state
}

/// Log every dead letter until the queue is gone.
pub fn spawn_dead_letter_logger(mut dead_letters: DeadLetterReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(letter) = dead_letters.recv().await {
            tracing::warn!(
                record_id = %letter.record_id,
                reason = %letter.reason,
                error = %letter.error,
                "Conversion did not complete"
            );
        }
        tracing::debug!("Dead letter channel closed");
    })
}
