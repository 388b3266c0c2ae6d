//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use intake_core::Config;
use intake_db::FileRecordRepository;
use std::sync::Arc;

/// Initialize the entire application against PostgreSQL and the configured storage root.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    tracing::info!(
        environment = %config.environment,
        upload_root = %config.upload_root,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(
        config.clone(),
        Arc::new(FileRecordRepository::new(pool)),
        storage,
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
