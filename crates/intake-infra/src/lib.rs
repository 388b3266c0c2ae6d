//! Intake infrastructure
//!
//! Shared pieces the HTTP service is assembled from:
//! - Telemetry initialization (tracing subscriber)
//! - Middleware (request ID)

pub mod middleware;
pub mod telemetry;

pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, LogFormat, DEFAULT_LOG_FILTER};
