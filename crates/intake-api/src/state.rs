//! Application state shared by every handler.

use intake_core::Config;
use intake_db::FileRecordStore;
use intake_processing::{ConversionPipeline, Normalizers, UploadCoordinator};
use intake_storage::Storage;
use intake_worker::{ConversionDispatcher, ConversionQueue, ConversionQueueConfig, DeadLetterReceiver};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn FileRecordStore>,
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadCoordinator,
    pub dispatcher: ConversionDispatcher,
}

impl AppState {
    /// Wire the upload and conversion services over `store` and `storage`.
    ///
    /// Starts the conversion worker pool, so this must run inside a tokio runtime.
    pub fn new(
        config: Config,
        store: Arc<dyn FileRecordStore>,
        storage: Arc<dyn Storage>,
    ) -> (Arc<Self>, DeadLetterReceiver) {
        let uploads = UploadCoordinator::new(store.clone(), storage.clone(), &config.original_dir);

        let pipeline = ConversionPipeline::new(
            store.clone(),
            Normalizers::from_config(storage.clone(), &config),
        );
        let (queue, dead_letters) = ConversionQueue::new(
            ConversionQueueConfig {
                max_workers: config.conversion_max_workers,
                capacity: config.conversion_queue_capacity,
            },
            Arc::new(pipeline),
        );
        let dispatcher = ConversionDispatcher::new(store.clone(), queue);

        let state = Arc::new(Self {
            config,
            store,
            storage,
            uploads,
            dispatcher,
        });
        (state, dead_letters)
    }

    pub fn queue(&self) -> &ConversionQueue {
        self.dispatcher.queue()
    }
}
