use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use intake_core::models::FileRecordResponse;
use intake_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File record ID")),
    responses(
        (status = 200, description = "File record", body = FileRecordResponse),
        (status = 404, description = "File record not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileRecordResponse>, HttpAppError> {
    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File record {} not found", id)))?;

    Ok(Json(record.into()))
}

/// Run the conversion of an existing record again.
#[utoipa::path(
    post,
    path = "/api/v1/files/{id}/convert",
    tag = "files",
    params(("id" = Uuid, Path, description = "File record ID")),
    responses(
        (status = 202, description = "Conversion scheduled", body = FileRecordResponse),
        (status = 404, description = "File record not found", body = ErrorResponse),
        (status = 415, description = "File type cannot be converted", body = ErrorResponse),
        (status = 503, description = "Conversion queue is full", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn convert_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<FileRecordResponse>), HttpAppError> {
    let record = state.dispatcher.redispatch(id).await?;
    Ok((StatusCode::ACCEPTED, Json(record.into())))
}
