//! PostgreSQL pool for file records.

use anyhow::{Context, Result};
use intake_core::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Connect and bring the `file_records` schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.database_url)
        .await
        .context("connecting to the file record database")?;

    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    Migrator::new(migrations)
        .await
        .context("loading file record migrations")?
        .run(&pool)
        .await
        .context("migrating file_records")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "File record database ready"
    );
    Ok(pool)
}
