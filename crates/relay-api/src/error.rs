//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; `AppError`
//! values (and types convertible into it) become `HttpAppError` so every
//! error renders consistently: status and code from `ErrorMetadata`, a
//! short client message, and internal detail in the logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{AppError, ErrorMetadata, LogLevel};
use relay_processing::ProcessingError;
use relay_shopify::ShopifyError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse is external, AppError lives in relay-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert platform client failures into the relay's error taxonomy.
pub fn map_shopify_error(err: ShopifyError) -> AppError {
    match err {
        ShopifyError::Cancelled => AppError::Cancelled,
        ShopifyError::Transport(msg) => AppError::Upstream(msg),
        ShopifyError::BlobRejected { status, body } => {
            AppError::BlobUploadRejected { status, body }
        }
        ShopifyError::Api(msg) => AppError::Platform(msg),
        ShopifyError::NoStagedTarget => {
            AppError::Platform("stagedUploadsCreate returned no usable target".to_string())
        }
        ShopifyError::MissingFileId => {
            AppError::Platform("fileCreate returned neither an id nor a url".to_string())
        }
        ShopifyError::InvalidResponse(msg) => AppError::Platform(msg),
    }
}

impl From<ShopifyError> for HttpAppError {
    fn from(err: ShopifyError) -> Self {
        HttpAppError(map_shopify_error(err))
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        let app = match err {
            ProcessingError::Cancelled => AppError::Cancelled,
            other => AppError::Internal(other.to_string()),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, "Request failed"),
    }
}

static PRODUCTION_MODE: std::sync::OnceLock<bool> = std::sync::OnceLock::new();

/// Record the loaded configuration's production flag for the response
/// renderer. Called once during state construction; later calls are ignored.
pub fn set_production_mode(is_production: bool) {
    let _ = PRODUCTION_MODE.set(is_production);
}

fn is_production_env() -> bool {
    *PRODUCTION_MODE.get().unwrap_or(&false)
}

/// Internal detail is hidden in production, and for sensitive errors
/// (token/infrastructure talk) always.
fn detail_for(error: &AppError) -> Option<String> {
    if is_production_env() || error.is_sensitive() {
        None
    } else {
        Some(error.to_string())
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            details: detail_for(app_error),
        });

        (status, body).into_response()
    }
}
