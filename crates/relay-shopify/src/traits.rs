use async_trait::async_trait;
use relay_core::models::MediaKind;
use tokio_util::sync::CancellationToken;

use crate::error::ShopifyError;
use crate::types::{BlobUpload, CreatedFile, FileReadiness, StagedTarget, StagedUploadRequest};

/// The platform operations the staged-upload driver depends on.
///
/// Every operation takes the job's cancellation token and must abort
/// promptly (returning [`ShopifyError::Cancelled`]) when it fires, so a
/// cancel request interrupts whichever call is in flight.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Request a pre-authorized staged upload target.
    async fn staged_uploads_create(
        &self,
        request: StagedUploadRequest,
        cancel: &CancellationToken,
    ) -> Result<StagedTarget, ShopifyError>;

    /// Push the bytes plus the target's required form fields to blob storage.
    async fn upload_to_target(
        &self,
        target: &StagedTarget,
        blob: BlobUpload,
        cancel: &CancellationToken,
    ) -> Result<(), ShopifyError>;

    /// Register the uploaded blob with the platform.
    async fn file_create(
        &self,
        resource_url: &str,
        kind: MediaKind,
        alt: &str,
        cancel: &CancellationToken,
    ) -> Result<CreatedFile, ShopifyError>;

    /// Query the processing status of a registered file.
    async fn file_status(
        &self,
        file_id: &str,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<FileReadiness, ShopifyError>;

    /// Forward a raw GraphQL request body and return the platform's JSON
    /// response verbatim.
    async fn proxy(&self, body: serde_json::Value) -> Result<serde_json::Value, ShopifyError>;
}
