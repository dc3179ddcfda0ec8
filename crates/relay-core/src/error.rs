//! Error types module
//!
//! All errors are unified under the `AppError` enum which covers input
//! validation, cancellation, the Shopify protocol stages, and internal
//! failures. The `ErrorMetadata` trait lets each variant self-describe its
//! HTTP response characteristics so the API crate can render them uniformly.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for user-initiated outcomes like cancellation
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PLATFORM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether internal detail should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upload cancelled by user")]
    Cancelled,

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Blob storage rejected upload: status {status}")]
    BlobUploadRejected { status: u16, body: String },

    #[error("Timed out waiting for file to become ready")]
    PollTimeout,

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, sensitive, log_level).
/// Oversize renders 400 rather than 413: the relay's public contract promises
/// a 400 with a short message for any client-side rejection.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (400, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::Cancelled => (400, "CANCELLED", false, LogLevel::Warn),
        AppError::Platform(_) => (500, "PLATFORM_ERROR", true, LogLevel::Error),
        AppError::BlobUploadRejected { .. } => (500, "BLOB_UPLOAD_REJECTED", true, LogLevel::Error),
        AppError::PollTimeout => (500, "POLL_TIMEOUT", false, LogLevel::Error),
        AppError::Upstream(_) => (500, "UPSTREAM_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::PayloadTooLarge(msg) => {
                msg.clone()
            }
            AppError::Cancelled => "Upload cancelled by user".to_string(),
            AppError::PollTimeout => {
                "Timed out waiting for the file to become ready".to_string()
            }
            // Upstream detail stays in logs; clients get a generic message.
            AppError::Platform(_)
            | AppError::BlobUploadRejected { .. }
            | AppError::Upstream(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => "Upload failed".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
