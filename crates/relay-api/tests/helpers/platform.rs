//! Scriptable recording mock for the platform client.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use relay_core::models::MediaKind;
use relay_shopify::{
    BlobUpload, CreatedFile, FileReadiness, PlatformClient, ShopifyError, StagedTarget,
    StagedUploadParameter, StagedUploadRequest,
};
use tokio_util::sync::CancellationToken;

pub const DELIVERY_URL: &str = "https://cdn.test-shop.example/files/final.jpg";

/// What `file_status` should report.
#[derive(Clone)]
pub enum StatusScript {
    /// Processing until the nth call, then ready.
    ReadyAfter(u32),
    /// Always FAILED.
    AlwaysFailed,
    /// Always processing; polling exhausts its attempts.
    NeverReady,
    /// Block until the job's cancellation token fires.
    HangUntilCancelled,
}

/// Mock platform: counts every call and follows a per-test script.
pub struct MockPlatform {
    pub staged_calls: AtomicU32,
    pub blob_calls: AtomicU32,
    pub create_calls: AtomicU32,
    pub status_calls: AtomicU32,
    /// `fileCreate` returns this URL directly, skipping polling.
    create_ready_url: Option<String>,
    status_script: StatusScript,
    fail_staged: bool,
    proxy_response: serde_json::Value,
}

impl MockPlatform {
    fn base() -> Self {
        Self {
            staged_calls: AtomicU32::new(0),
            blob_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            create_ready_url: None,
            status_script: StatusScript::ReadyAfter(1),
            fail_staged: false,
            proxy_response: serde_json::json!({ "data": { "shop": { "name": "Test Shop" } } }),
        }
    }

    /// `fileCreate` resolves the URL synchronously; no polling expected.
    pub fn with_create_url() -> Self {
        Self {
            create_ready_url: Some(DELIVERY_URL.to_string()),
            ..Self::base()
        }
    }

    /// File becomes ready on the nth status poll.
    pub fn ready_after(polls: u32) -> Self {
        Self {
            status_script: StatusScript::ReadyAfter(polls),
            ..Self::base()
        }
    }

    pub fn with_status_script(script: StatusScript) -> Self {
        Self {
            status_script: script,
            ..Self::base()
        }
    }

    pub fn failing_staged_create() -> Self {
        Self {
            fail_staged: true,
            ..Self::base()
        }
    }

    pub fn with_proxy_response(response: serde_json::Value) -> Self {
        Self {
            proxy_response: response,
            ..Self::base()
        }
    }

    pub fn staged_count(&self) -> u32 {
        self.staged_calls.load(Ordering::SeqCst)
    }

    pub fn blob_count(&self) -> u32 {
        self.blob_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn staged_uploads_create(
        &self,
        _request: StagedUploadRequest,
        cancel: &CancellationToken,
    ) -> Result<StagedTarget, ShopifyError> {
        self.staged_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ShopifyError::Cancelled);
        }
        if self.fail_staged {
            return Err(ShopifyError::Api(
                "stagedUploadsCreate userErrors: mock failure".to_string(),
            ));
        }
        Ok(StagedTarget {
            url: "https://storage.test-shop.example/staged".to_string(),
            resource_url: "https://storage.test-shop.example/staged/resource".to_string(),
            parameters: vec![StagedUploadParameter {
                name: "key".to_string(),
                value: "staged/resource".to_string(),
            }],
        })
    }

    async fn upload_to_target(
        &self,
        _target: &StagedTarget,
        _blob: BlobUpload,
        cancel: &CancellationToken,
    ) -> Result<(), ShopifyError> {
        self.blob_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ShopifyError::Cancelled);
        }
        Ok(())
    }

    async fn file_create(
        &self,
        _resource_url: &str,
        _kind: MediaKind,
        _alt: &str,
        cancel: &CancellationToken,
    ) -> Result<CreatedFile, ShopifyError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ShopifyError::Cancelled);
        }
        Ok(CreatedFile {
            id: Some("gid://shopify/MediaImage/42".to_string()),
            ready_url: self.create_ready_url.clone(),
        })
    }

    async fn file_status(
        &self,
        _file_id: &str,
        _kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<FileReadiness, ShopifyError> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if cancel.is_cancelled() {
            return Err(ShopifyError::Cancelled);
        }
        match &self.status_script {
            StatusScript::ReadyAfter(n) if call >= *n => {
                Ok(FileReadiness::Ready(DELIVERY_URL.to_string()))
            }
            StatusScript::ReadyAfter(_) => Ok(FileReadiness::Processing),
            StatusScript::AlwaysFailed => {
                Ok(FileReadiness::Failed("mock processing failure".to_string()))
            }
            StatusScript::NeverReady => Ok(FileReadiness::Processing),
            StatusScript::HangUntilCancelled => {
                cancel.cancelled().await;
                Err(ShopifyError::Cancelled)
            }
        }
    }

    async fn proxy(&self, _body: serde_json::Value) -> Result<serde_json::Value, ShopifyError> {
        Ok(self.proxy_response.clone())
    }
}
