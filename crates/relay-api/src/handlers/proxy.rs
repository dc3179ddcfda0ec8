use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Forward a GraphQL request to the platform's Admin API.
///
/// The body is passed through untouched and the server-held access token is
/// attached, so browser clients never see it. The platform's JSON response
/// comes back verbatim, including its own error payloads; only a transport
/// failure produces a 500 here.
#[utoipa::path(
    post,
    path = "/shopify-admin-proxy",
    tag = "proxy",
    request_body = Object,
    responses(
        (status = 200, description = "Platform response, verbatim", body = Object),
        (status = 500, description = "Transport failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "admin_proxy"))]
pub async fn admin_proxy(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, HttpAppError> {
    let response = state.platform.proxy(body).await?;
    Ok(Json(response))
}
