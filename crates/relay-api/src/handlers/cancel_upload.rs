use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use relay_core::models::CancelUploadResponse;
use relay_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Cancel an in-flight upload.
///
/// Fires the job's cancellation token so whichever protocol stage is running
/// stops, moves the job to `cancelled`, and deletes its temp artifacts.
/// Cancelling an already-terminal job succeeds without changing it.
#[utoipa::path(
    delete,
    path = "/api/cancel-upload/{upload_id}",
    tag = "uploads",
    params(
        ("upload_id" = Uuid, Path, description = "Upload job id")
    ),
    responses(
        (status = 200, description = "Cancellation accepted", body = CancelUploadResponse),
        (status = 404, description = "Unknown upload id", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(upload_id = %upload_id, operation = "cancel_upload"))]
pub async fn cancel_upload(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<Uuid>,
) -> Result<Json<CancelUploadResponse>, HttpAppError> {
    state
        .jobs
        .cancel(upload_id)
        .await
        .ok_or_else(|| AppError::NotFound("Unknown upload id".to_string()))?;

    tracing::info!("Upload cancelled");
    Ok(Json(CancelUploadResponse { success: true }))
}
