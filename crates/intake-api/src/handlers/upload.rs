use crate::error::{multipart_error, ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::Field, Multipart, State},
    http::{header, StatusCode},
    Json,
};
use chrono::Utc;
use futures::TryStreamExt;
use intake_core::models::{FileRecord, FileRecordResponse};
use intake_core::{AppError, ErrorMetadata};
use intake_processing::upload::IncomingFile;
use intake_processing::classify;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

/// Multipart field carrying the uploaded files. May repeat.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UploadSummary {
    pub success: usize,
    pub failed: usize,
    pub files: Vec<FileRecordResponse>,
    /// One `"<filename>: <reason>"` entry per rejected file.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/files/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "At least one file was stored", body = UploadSummary),
        (status = 400, description = "No file could be stored", body = UploadSummary),
        (status = 413, description = "Request too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadSummary>), HttpAppError> {
    let directory = state.uploads.directory_for(Utc::now().date_naive());
    let mut summary = UploadSummary::default();
    let mut received = 0usize;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // A broken body before any file is a bad request. After that, files already
            // stored stay stored and the rest of the body is reported as one failure.
            Err(e) if received == 0 => return Err(multipart_error(e).into()),
            Err(e) => {
                let e = multipart_error(e);
                tracing::debug!(error = %e, "Multipart body ended early");
                summary.errors.push(format!(": {}", e.client_message()));
                break;
            }
        };
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        received += 1;

        let filename = field.file_name().unwrap_or_default().to_string();
        match store_field(&state, &directory, &filename, field).await {
            Ok(record) => summary.files.push(record.into()),
            Err(e) => {
                tracing::debug!(filename = %filename, error = %e, "File rejected");
                summary
                    .errors
                    .push(format!("{}: {}", filename, e.client_message()));
            }
        }
    }

    if received == 0 {
        return Err(AppError::BadRequest("no files".to_string()).into());
    }

    summary.success = summary.files.len();
    summary.failed = summary.errors.len();
    tracing::info!(
        success = summary.success,
        failed = summary.failed,
        directory = %directory,
        "Upload request processed"
    );

    let status = if summary.success > 0 {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(summary)))
}

/// Store one multipart file and hand it to the dispatcher.
async fn store_field(
    state: &AppState,
    directory: &str,
    filename: &str,
    field: Field<'_>,
) -> Result<FileRecord, AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::InvalidInput("empty filename".to_string()));
    }
    // Unsupported types never reach storage.
    classify(filename)?;

    let incoming = IncomingFile {
        filename: filename.to_string(),
        content_type: field.content_type().map(str::to_string),
        declared_size: field
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok()),
    };
    let reader = StreamReader::new(field.map_err(io::Error::other));
    let record = state
        .uploads
        .store(directory, &incoming, Box::pin(reader))
        .await?;

    // The file is stored either way; a scheduling failure is already on the record.
    match state.dispatcher.dispatch(&record).await {
        Ok(kind) => Ok(FileRecord {
            file_kind: Some(kind),
            ..record
        }),
        Err(e) => {
            tracing::warn!(record_id = %record.id, error = %e, "Conversion not scheduled");
            Ok(state.store.get(record.id).await?.unwrap_or(record))
        }
    }
}
