//! Configuration module
//!
//! Settings for the HTTP server, the database pool, the upload tree layout and the
//! conversion worker pool. Values come from the environment (a `.env` file is loaded
//! first when present).

use std::env;

use crate::constants::DEFAULT_JPEG_QUALITY;

const SERVER_PORT: u16 = 8080;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_BYTES: usize = 100 * 1024 * 1024;
const CONVERSION_MAX_WORKERS: usize = 4;
const CONVERSION_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Filesystem root holding both the original and the processed trees.
    pub upload_root: String,
    pub original_dir: String,
    pub processed_dir: String,
    pub max_upload_size_bytes: usize,
    pub conversion_max_workers: usize,
    pub conversion_queue_capacity: usize,
    pub jpeg_quality: u8,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            database_url: String::new(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            upload_root: "uploads".to_string(),
            original_dir: "original".to_string(),
            processed_dir: "processed".to_string(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_BYTES,
            conversion_max_workers: CONVERSION_MAX_WORKERS,
            conversion_queue_capacity: CONVERSION_QUEUE_CAPACITY,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let config = Self {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            environment,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            upload_root: env::var("UPLOAD_ROOT").unwrap_or(defaults.upload_root),
            original_dir: env::var("ORIGINAL_DIR").unwrap_or(defaults.original_dir),
            processed_dir: env::var("PROCESSED_DIR").unwrap_or(defaults.processed_dir),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_BYTES")
                .unwrap_or_else(|_| MAX_UPLOAD_SIZE_BYTES.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_UPLOAD_SIZE_BYTES),
            conversion_max_workers: env::var("CONVERSION_MAX_WORKERS")
                .unwrap_or_else(|_| CONVERSION_MAX_WORKERS.to_string())
                .parse::<usize>()
                .unwrap_or(CONVERSION_MAX_WORKERS),
            conversion_queue_capacity: env::var("CONVERSION_QUEUE_CAPACITY")
                .unwrap_or_else(|_| CONVERSION_QUEUE_CAPACITY.to_string())
                .parse::<usize>()
                .unwrap_or(CONVERSION_QUEUE_CAPACITY),
            jpeg_quality: env::var("JPEG_QUALITY")
                .unwrap_or_else(|_| DEFAULT_JPEG_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JPEG_QUALITY must be a number between 1 and 100"))?,
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.trim().is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL must not be empty"));
        }

        if self.conversion_max_workers == 0 {
            return Err(anyhow::anyhow!(
                "CONVERSION_MAX_WORKERS must be greater than zero"
            ));
        }

        if self.conversion_queue_capacity == 0 {
            return Err(anyhow::anyhow!(
                "CONVERSION_QUEUE_CAPACITY must be greater than zero"
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!(
                "JPEG_QUALITY must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        let original = self.original_dir.trim_matches('/');
        let processed = self.processed_dir.trim_matches('/');
        if original.is_empty() || processed.is_empty() {
            return Err(anyhow::anyhow!(
                "ORIGINAL_DIR and PROCESSED_DIR must not be empty"
            ));
        }
        if original == processed {
            return Err(anyhow::anyhow!(
                "ORIGINAL_DIR and PROCESSED_DIR must point to different trees"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
