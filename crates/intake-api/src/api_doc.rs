//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use intake_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Intake API",
        version = "0.1.0",
        description = "Upload intake service. Stores uploads under sequential per-day names and normalizes images to JPEG and documents to Markdown in the background."
    ),
    paths(
        handlers::upload::upload_files,
        handlers::files::get_file,
        handlers::files::convert_file,
        handlers::health::ping,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::upload::UploadSummary,
        handlers::health::HealthCheckResponse,
        models::FileRecordResponse,
        models::FileKind,
        models::ImageMetadata,
        models::DocumentMetadata,
        error::ErrorResponse,
    )),
    tags(
        (name = "files", description = "Upload and conversion"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;
