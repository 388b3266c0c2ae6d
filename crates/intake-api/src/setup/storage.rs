//! Storage setup and initialization

use anyhow::{Context, Result};
use intake_core::Config;
use intake_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the storage root and both top-level areas below it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to create storage")?;

    for dir in [&config.original_dir, &config.processed_dir] {
        storage
            .ensure_dir(dir)
            .await
            .with_context(|| format!("Failed to create storage directory {}", dir))?;
    }

    storage
        .health_check()
        .await
        .context("Storage health check failed")?;
    tracing::info!(
        original_dir = %config.original_dir,
        processed_dir = %config.processed_dir,
        "Storage initialized successfully"
    );

    Ok(storage)
}
