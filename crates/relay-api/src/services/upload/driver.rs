//! Staged-upload driver.
//!
//! Drives one job through the platform's three-step ingestion protocol,
//! reporting progress through the tracker: local transformation, staged
//! target creation, blob push, file registration, and readiness polling.
//! Every network call and the external transcode are bound to the job's
//! cancellation token, so a cancel request interrupts whichever operation
//! is in flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use relay_core::models::{MediaKind, UploadStatus};
use relay_core::AppError;
use relay_processing::{ImageCompressor, ProcessingError, VideoTranscoder};
use relay_shopify::{BlobUpload, FileReadiness, PlatformClient, StagedUploadRequest};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::services::tracker::JobStore;

// Progress checkpoints reported through the tracker.
const PROGRESS_COMPRESSING: u8 = 10;
const PROGRESS_STAGED: u8 = 30;
const PROGRESS_BLOB_UPLOADED: u8 = 60;
const PROGRESS_REGISTERED: u8 = 80;

#[derive(Clone)]
pub struct UploadDriver {
    jobs: JobStore,
    platform: Arc<dyn PlatformClient>,
    compressor: ImageCompressor,
    transcoder: Option<VideoTranscoder>,
    temp_dir: PathBuf,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

impl UploadDriver {
    pub fn new(
        jobs: JobStore,
        platform: Arc<dyn PlatformClient>,
        compressor: ImageCompressor,
        transcoder: Option<VideoTranscoder>,
        temp_dir: PathBuf,
        poll_interval: Duration,
        poll_max_attempts: u32,
    ) -> Self {
        Self {
            jobs,
            platform,
            compressor,
            transcoder,
            temp_dir,
            poll_interval,
            poll_max_attempts,
        }
    }

    /// Run the full protocol for a registered job and return the delivery
    /// URL. The job ends in `completed`, `error`, or `cancelled` - never in
    /// a live state.
    #[tracing::instrument(skip(self, data), fields(job_id = %job_id, kind = %kind.as_str(), size = data.len()))]
    pub async fn run(
        &self,
        job_id: Uuid,
        data: Vec<u8>,
        filename: &str,
        mime_type: &str,
        kind: MediaKind,
    ) -> Result<String, AppError> {
        match self.drive(job_id, data, filename, mime_type, kind).await {
            Ok(url) => {
                self.jobs.complete(job_id, url.clone()).await;
                Ok(url)
            }
            Err(AppError::Cancelled) => {
                // The cancel handler already moved the job to its terminal
                // state and cleaned up.
                Err(AppError::Cancelled)
            }
            Err(e) => {
                self.jobs.fail(job_id, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        job_id: Uuid,
        data: Vec<u8>,
        filename: &str,
        mime_type: &str,
        kind: MediaKind,
    ) -> Result<String, AppError> {
        let cancel = self
            .jobs
            .cancel_token(job_id)
            .await
            .ok_or_else(|| AppError::NotFound("Unknown upload id".to_string()))?;
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Step 1: local transformation; errors degrade to the original bytes.
        self.jobs
            .advance(job_id, UploadStatus::Compressing, PROGRESS_COMPRESSING)
            .await;
        let data = self.transform(job_id, data, kind, &cancel).await?;

        // Step 2: staged upload target.
        self.jobs
            .advance(job_id, UploadStatus::Uploading, PROGRESS_STAGED)
            .await;
        let request = StagedUploadRequest::new(filename, mime_type, kind, data.len());
        let target = self
            .platform
            .staged_uploads_create(request, &cancel)
            .await
            .map_err(crate::error::map_shopify_error)?;

        // Step 3: push the bytes to blob storage.
        let blob = BlobUpload {
            bytes: data,
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
        };
        self.platform
            .upload_to_target(&target, blob, &cancel)
            .await
            .map_err(crate::error::map_shopify_error)?;
        self.jobs
            .advance(job_id, UploadStatus::Uploading, PROGRESS_BLOB_UPLOADED)
            .await;

        // Step 4: register the blob with the platform.
        let created = self
            .platform
            .file_create(&target.resource_url, kind, filename, &cancel)
            .await
            .map_err(crate::error::map_shopify_error)?;
        self.jobs
            .advance(job_id, UploadStatus::Uploading, PROGRESS_REGISTERED)
            .await;

        // Step 5: polling is purely a fallback for asynchronously processed
        // resources; a synchronously resolved URL skips it entirely.
        if let Some(url) = created.ready_url {
            return Ok(url);
        }
        let file_id = created.id.ok_or_else(|| {
            AppError::Platform("fileCreate returned neither an id nor a url".to_string())
        })?;
        self.poll_until_ready(&file_id, kind, &cancel).await
    }

    /// Poll the file-status query until READY, bounded by the attempt budget.
    async fn poll_until_ready(
        &self,
        file_id: &str,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        for attempt in 1..=self.poll_max_attempts {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            match self
                .platform
                .file_status(file_id, kind, cancel)
                .await
                .map_err(crate::error::map_shopify_error)?
            {
                FileReadiness::Ready(url) => {
                    tracing::debug!(attempt, "File ready");
                    return Ok(url);
                }
                FileReadiness::Failed(message) => return Err(AppError::Platform(message)),
                FileReadiness::Processing => {
                    tracing::debug!(attempt, "File still processing");
                }
            }
            if attempt < self.poll_max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(AppError::Cancelled),
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }
        Err(AppError::PollTimeout)
    }

    /// Kind-appropriate local transformation. Cancellation aborts the job;
    /// any other failure falls back to the untransformed original.
    async fn transform(
        &self,
        job_id: Uuid,
        data: Vec<u8>,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, AppError> {
        match kind {
            MediaKind::Image => match self.compressor.compress(data.clone(), cancel).await {
                Ok(compressed) => Ok(compressed),
                Err(ProcessingError::Cancelled) => Err(AppError::Cancelled),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Image compression failed, using original");
                    Ok(data)
                }
            },
            MediaKind::Video => self.transcode_video(job_id, data, cancel).await,
            MediaKind::Generic => Ok(data),
        }
    }

    async fn transcode_video(
        &self,
        job_id: Uuid,
        data: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, AppError> {
        let Some(transcoder) = &self.transcoder else {
            return Ok(data);
        };

        let input = self.temp_dir.join(format!("upload-{}-in.bin", job_id));
        let output = self.temp_dir.join(format!("upload-{}-out.mp4", job_id));
        if let Err(e) = tokio::fs::write(&input, &data).await {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to stage video for transcode, using original");
            return Ok(data);
        }
        self.jobs.add_temp_resource(job_id, input.clone()).await;
        self.jobs.add_temp_resource(job_id, output.clone()).await;

        match transcoder.transcode(&input, &output, cancel).await {
            Ok(()) => match tokio::fs::read(&output).await {
                Ok(transcoded) => Ok(transcoded),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to read transcoded video, using original");
                    Ok(data)
                }
            },
            Err(ProcessingError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Transcode failed, using original");
                Ok(data)
            }
        }
    }
}
