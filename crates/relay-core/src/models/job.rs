//! Upload job model and the small state machine it moves through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::error::AppError;

/// Lifecycle state of an upload job.
///
/// `Completed`, `Error`, and `Cancelled` are terminal: once reached, the
/// status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Waiting,
    Compressing,
    Uploading,
    Completed,
    Error,
    Cancelled,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadStatus::Completed | UploadStatus::Error | UploadStatus::Cancelled
        )
    }

    /// Whether the driver may move a job from `self` to `next`.
    ///
    /// Forward transitions follow waiting → compressing → uploading →
    /// {completed, error}; any non-terminal state may be cancelled.
    pub fn allows_transition_to(self, next: UploadStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            UploadStatus::Waiting => false,
            UploadStatus::Compressing => self == UploadStatus::Waiting,
            UploadStatus::Uploading => {
                matches!(self, UploadStatus::Compressing | UploadStatus::Uploading)
            }
            UploadStatus::Completed | UploadStatus::Error => self == UploadStatus::Uploading,
            UploadStatus::Cancelled => true,
        }
    }
}

/// Platform-side resource category, derived from the client's `fileType`
/// field. Determines the declared resource kind, the fileCreate content
/// category, the applicable size limit, and the ready-URL response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Generic,
}

impl MediaKind {
    /// Parse the client-supplied `fileType`. MIME types are accepted as well
    /// as the bare kind names; anything else non-empty is a generic file.
    pub fn parse(file_type: &str) -> Result<Self, AppError> {
        let normalized = file_type.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::InvalidInput("Missing fileType".to_string()));
        }
        if normalized == "image" || normalized.starts_with("image/") {
            Ok(MediaKind::Image)
        } else if normalized == "video" || normalized.starts_with("video/") {
            Ok(MediaKind::Video)
        } else {
            Ok(MediaKind::Generic)
        }
    }

    /// Resource kind declared in `stagedUploadsCreate`.
    pub fn staged_resource(self) -> &'static str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
            MediaKind::Generic => "FILE",
        }
    }

    /// Content category passed to `fileCreate`.
    pub fn content_category(self) -> &'static str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
            MediaKind::Generic => "FILE",
        }
    }

    /// Applicable size limit for this kind.
    pub fn max_size_bytes(self, config: &RelayConfig) -> usize {
        match self {
            MediaKind::Image => config.max_image_size_bytes,
            MediaKind::Video => config.max_video_size_bytes,
            MediaKind::Generic => config.max_file_size_bytes,
        }
    }

    /// Fallback MIME type when the client did not declare one.
    pub fn default_mime(self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Video => "video/mp4",
            MediaKind::Generic => "application/octet-stream",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Generic => "generic",
        }
    }
}

/// A tracked upload job as reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadJob {
    pub id: Uuid,
    pub status: UploadStatus,
    /// 0-100, monotonically non-decreasing while the job is live.
    pub progress: u8,
    pub kind: MediaKind,
    pub original_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UploadJob {
    pub fn new(filename: String, kind: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: UploadStatus::Waiting,
            progress: 0,
            kind,
            original_filename: filename,
            error: None,
            url: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitUploadRequest {
    pub filename: Option<String>,
    #[serde(rename = "fileType")]
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitUploadResponse {
    pub upload_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadFileResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelUploadResponse {
    pub success: bool,
}
