use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use relay_core::models::UploadJob;
use relay_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Current state of an upload job.
#[utoipa::path(
    get,
    path = "/api/upload-status/{upload_id}",
    tag = "uploads",
    params(
        ("upload_id" = Uuid, Path, description = "Upload job id")
    ),
    responses(
        (status = 200, description = "Job record", body = UploadJob),
        (status = 404, description = "Unknown upload id", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(upload_id = %upload_id, operation = "upload_status"))]
pub async fn upload_status(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
) -> Result<Json<UploadJob>, HttpAppError> {
    let job = state
        .jobs
        .get(upload_id)
        .await
        .ok_or_else(|| AppError::NotFound("Unknown upload id".to_string()))?;

    Ok(Json(job))
}
