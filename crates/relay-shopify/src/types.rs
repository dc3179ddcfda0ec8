//! Wire types for the staged-upload protocol and the kind-specific rules for
//! pulling a delivery URL out of the platform's responses.

use relay_core::models::MediaKind;
use serde::{Deserialize, Serialize};

use crate::error::ShopifyError;

/// Input for `stagedUploadsCreate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadRequest {
    pub filename: String,
    pub mime_type: String,
    /// Declared resource kind: `FILE`, `IMAGE`, or `VIDEO`.
    pub resource: String,
    pub file_size: String,
    pub http_method: String,
}

impl StagedUploadRequest {
    pub fn new(filename: &str, mime_type: &str, kind: MediaKind, file_size: usize) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            resource: kind.staged_resource().to_string(),
            file_size: file_size.to_string(),
            http_method: "POST".to_string(),
        }
    }
}

/// A form parameter the blob store requires on upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedUploadParameter {
    pub name: String,
    pub value: String,
}

/// Pre-authorized upload target returned by `stagedUploadsCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    /// Blob-storage URL the bytes are POSTed to.
    pub url: String,
    /// The URL the platform knows the blob by; passed to `fileCreate`.
    pub resource_url: String,
    pub parameters: Vec<StagedUploadParameter>,
}

/// The bytes and identity of the blob pushed to the staged target.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Outcome of `fileCreate`. A URL is present only when the platform resolved
/// the resource synchronously (in which case polling is skipped); otherwise
/// the opaque file id is polled until ready.
#[derive(Debug, Clone)]
pub struct CreatedFile {
    pub id: Option<String>,
    pub ready_url: Option<String>,
}

/// One observation of the platform's processing status for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReadiness {
    /// Processing finished; delivery URL extracted per resource kind.
    Ready(String),
    /// Still processing; poll again.
    Processing,
    /// The platform reported a permanent processing failure.
    Failed(String),
}

/// Extract the kind-specific delivery URL from a `node` query response:
/// a direct image URL, the first of a video's delivery sources, or the
/// generic file's `url` field.
pub fn extract_ready_url(kind: MediaKind, node: &serde_json::Value) -> Result<String, ShopifyError> {
    let url = match kind {
        MediaKind::Image => node
            .pointer("/image/url")
            .or_else(|| node.pointer("/preview/image/url"))
            .and_then(|v| v.as_str()),
        MediaKind::Video => node
            .pointer("/sources/0/url")
            .and_then(|v| v.as_str()),
        MediaKind::Generic => node.pointer("/url").and_then(|v| v.as_str()),
    };
    url.map(str::to_string).ok_or_else(|| {
        ShopifyError::InvalidResponse(format!(
            "file is READY but no {} url present in node",
            kind.as_str()
        ))
    })
}
