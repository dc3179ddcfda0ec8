use std::sync::Arc;

use axum::{extract::State, Json};
use relay_core::models::{InitUploadRequest, InitUploadResponse, MediaKind};
use relay_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::sanitize_filename;

/// Register an upload job before the file is sent.
///
/// Returns an upload id the client uses for the subsequent file transfer,
/// status polling, and cancellation.
#[utoipa::path(
    post,
    path = "/api/init-upload",
    tag = "uploads",
    request_body = InitUploadRequest,
    responses(
        (status = 200, description = "Upload job registered", body = InitUploadResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "init_upload"))]
pub async fn init_upload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InitUploadRequest>,
) -> Result<Json<InitUploadResponse>, HttpAppError> {
    let filename = request
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing filename".to_string()))?;
    let file_type = request
        .file_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing fileType".to_string()))?;

    let kind = MediaKind::parse(file_type)?;
    let filename = sanitize_filename(filename)?;

    let job = state.jobs.register(filename, kind).await;
    tracing::info!(upload_id = %job.id, kind = %kind.as_str(), "Upload job registered");

    Ok(Json(InitUploadResponse { upload_id: job.id }))
}
