use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use relay_core::models::{MediaKind, UploadFileResponse};
use relay_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_upload, sanitize_filename, validate_file_size};

/// Upload a file through the staged-upload protocol.
///
/// Accepts a multipart form with the file, its `fileType`, and an optional
/// `uploadId` from a prior init call. The request blocks until the platform
/// delivers a final URL; the client polls the status endpoint for progress
/// in the meantime. The size check runs before any network traffic.
#[utoipa::path(
    post,
    path = "/api/upload-file",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded and registered", body = UploadFileResponse),
        (status = 400, description = "Missing file, oversize file, or cancelled upload", body = ErrorResponse),
        (status = 404, description = "Unknown upload id", body = ErrorResponse),
        (status = 500, description = "Platform or transport failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadFileResponse>, HttpAppError> {
    let form = extract_multipart_upload(multipart).await?;

    let file_type = form
        .file_type
        .as_deref()
        .or(form.content_type.as_deref())
        .ok_or_else(|| AppError::InvalidInput("Missing fileType".to_string()))?;
    let kind = MediaKind::parse(file_type)?;

    let filename = sanitize_filename(form.filename.as_deref().unwrap_or("file"))?;
    let mime_type = form
        .content_type
        .clone()
        .unwrap_or_else(|| kind.default_mime().to_string());

    // Resolve the job: reuse the one from init-upload when an id was sent,
    // otherwise register on the fly.
    let job_id = match form.upload_id.as_deref() {
        Some(raw) => {
            let id: Uuid = raw
                .parse()
                .map_err(|_| AppError::InvalidInput("Invalid uploadId".to_string()))?;
            state
                .jobs
                .get(id)
                .await
                .ok_or_else(|| AppError::NotFound("Unknown upload id".to_string()))?
                .id
        }
        None => state.jobs.register(filename.clone(), kind).await.id,
    };

    // Reject oversize payloads before touching the network. The job is left
    // in `waiting` (the error path belongs to the driver's protocol stages);
    // the sweeper evicts it with the rest of the stale jobs.
    validate_file_size(form.data.len(), kind.max_size_bytes(&state.config))?;

    let url = state
        .driver
        .run(job_id, form.data, &filename, &mime_type, kind)
        .await?;

    Ok(Json(UploadFileResponse { url }))
}
