use crate::{LocalStorage, Storage, StorageResult};
use intake_core::Config;
use std::sync::Arc;

/// Create the storage backend rooted at `UPLOAD_ROOT`.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(&config.upload_root).await?;

    tracing::info!(
        root = %storage.base_path().display(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
