use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::state::AppState;

/// Liveness probe - process is up and the tracker is reachable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = Object)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "alive",
        "environment": state.config.environment,
    }))
}
