//! Intake API Library
//!
//! HTTP handlers and application setup for the upload intake service.

mod api_doc;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use api_doc::get_openapi_spec;
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::upload::UploadSummary;
pub use state::AppState;
