//! Upload job tracker.
//!
//! Owns the table of in-flight upload jobs: their state transitions, the
//! per-job cancellation token every downstream operation observes, and the
//! temporary files a job leaves behind. The table is process-wide and in
//! memory only; a restart loses all job history.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use relay_core::models::{MediaKind, UploadJob, UploadStatus};
use tokio::sync::RwLock;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct JobEntry {
    job: UploadJob,
    cancel: CancellationToken,
    temp_resources: Vec<PathBuf>,
}

/// Shared, injectable job store. All mutations of a job's state and progress
/// happen under one write lock, so concurrent readers never observe a
/// status/progress pair that never existed.
#[derive(Clone)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
    retention: Duration,
}

impl JobStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    /// Create a job in `waiting` state and return it.
    pub async fn register(&self, filename: String, kind: MediaKind) -> UploadJob {
        let job = UploadJob::new(filename, kind);
        let entry = JobEntry {
            job: job.clone(),
            cancel: CancellationToken::new(),
            temp_resources: Vec::new(),
        };
        self.inner.write().await.insert(job.id, entry);
        tracing::info!(job_id = %job.id, kind = %job.kind.as_str(), "Upload job registered");
        job
    }

    pub async fn get(&self, id: Uuid) -> Option<UploadJob> {
        self.inner.read().await.get(&id).map(|e| e.job.clone())
    }

    /// The cancellation token downstream operations bind to.
    pub async fn cancel_token(&self, id: Uuid) -> Option<CancellationToken> {
        self.inner.read().await.get(&id).map(|e| e.cancel.clone())
    }

    /// Record a temporary artifact owned by the job; deleted on any terminal
    /// transition or eviction. If the job already went terminal (a cancel
    /// racing the driver), the artifact is deleted right away instead.
    pub async fn add_temp_resource(&self, id: Uuid, path: PathBuf) {
        {
            let mut table = self.inner.write().await;
            if let Some(entry) = table.get_mut(&id) {
                if !entry.job.status.is_terminal() {
                    entry.temp_resources.push(path);
                    return;
                }
            } else {
                return;
            }
        }
        cleanup_temp_resources(&[path]).await;
    }

    /// Advance a live job to a new non-terminal status. Terminal jobs and
    /// out-of-order transitions are left untouched; progress never decreases.
    pub async fn advance(&self, id: Uuid, status: UploadStatus, progress: u8) {
        let mut table = self.inner.write().await;
        let Some(entry) = table.get_mut(&id) else {
            return;
        };
        if !entry.job.status.allows_transition_to(status) {
            tracing::debug!(
                job_id = %id,
                from = ?entry.job.status,
                to = ?status,
                "Ignoring disallowed transition"
            );
            return;
        }
        entry.job.status = status;
        entry.job.progress = entry.job.progress.max(progress);
    }

    /// Terminal success: store the resolved URL and clean up temp files.
    pub async fn complete(&self, id: Uuid, url: String) {
        let temp = {
            let mut table = self.inner.write().await;
            let Some(entry) = table.get_mut(&id) else {
                return;
            };
            if !entry.job.status.allows_transition_to(UploadStatus::Completed) {
                return;
            }
            entry.job.status = UploadStatus::Completed;
            entry.job.progress = 100;
            entry.job.url = Some(url);
            std::mem::take(&mut entry.temp_resources)
        };
        tracing::info!(job_id = %id, "Upload completed");
        cleanup_temp_resources(&temp).await;
    }

    /// Terminal failure: store the message and clean up temp files. A job
    /// that was cancelled in the meantime keeps its cancelled state.
    pub async fn fail(&self, id: Uuid, message: String) {
        let temp = {
            let mut table = self.inner.write().await;
            let Some(entry) = table.get_mut(&id) else {
                return;
            };
            if entry.job.status.is_terminal() {
                return;
            }
            entry.job.status = UploadStatus::Error;
            entry.job.error = Some(message.clone());
            std::mem::take(&mut entry.temp_resources)
        };
        tracing::warn!(job_id = %id, error = %message, "Upload failed");
        cleanup_temp_resources(&temp).await;
    }

    /// Cancel a live job: fire its token so any in-flight network call or
    /// external process aborts, mark it cancelled, and delete its temp
    /// files. Cancelling a terminal job is a no-op. Returns the job as it
    /// stands, or `None` for an unknown id.
    pub async fn cancel(&self, id: Uuid) -> Option<UploadJob> {
        let (job, temp) = {
            let mut table = self.inner.write().await;
            let entry = table.get_mut(&id)?;
            if entry.job.status.is_terminal() {
                return Some(entry.job.clone());
            }
            entry.cancel.cancel();
            entry.job.status = UploadStatus::Cancelled;
            entry.job.error = Some("Upload cancelled by user".to_string());
            (entry.job.clone(), std::mem::take(&mut entry.temp_resources))
        };
        tracing::info!(job_id = %id, "Upload cancelled");
        cleanup_temp_resources(&temp).await;
        Some(job)
    }

    /// Evict jobs older than the retention window and delete their temp
    /// files. Live jobs past retention are cancelled first so any stuck
    /// operation is torn down with them.
    pub async fn sweep(&self) {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.retention)
                .unwrap_or_else(|_| chrono::Duration::hours(1));
        let (evicted, temp) = {
            let mut table = self.inner.write().await;
            let expired: Vec<Uuid> = table
                .iter()
                .filter(|(_, e)| e.job.created_at < cutoff)
                .map(|(id, _)| *id)
                .collect();
            let mut temp = Vec::new();
            for id in &expired {
                if let Some(entry) = table.remove(id) {
                    entry.cancel.cancel();
                    temp.extend(entry.temp_resources);
                }
            }
            (expired.len(), temp)
        };
        if evicted > 0 {
            tracing::info!(evicted, "Swept expired upload jobs");
        }
        cleanup_temp_resources(&temp).await;
    }

    /// Start the recurring sweep task. Returns a JoinHandle for shutdown.
    pub fn start_sweeper(self, sweep_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_timer = interval(sweep_interval);
            // The first tick fires immediately; skip it so a fresh process
            // doesn't sweep an empty table at startup.
            sweep_timer.tick().await;
            loop {
                sweep_timer.tick().await;
                self.sweep().await;
            }
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub async fn backdate(&self, id: Uuid, age: Duration) {
        if let Some(entry) = self.inner.write().await.get_mut(&id) {
            entry.job.created_at = Utc::now() - chrono::Duration::from_std(age).unwrap();
        }
    }
}

/// Best-effort, idempotent deletion: a path that is already gone is fine,
/// anything else is logged and skipped.
async fn cleanup_temp_resources(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Deleted temp resource"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete temp resource");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> JobStore {
        JobStore::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn register_starts_waiting_with_zero_progress() {
        let jobs = store();
        let job = jobs.register("a.png".to_string(), MediaKind::Image).await;
        assert_eq!(job.status, UploadStatus::Waiting);
        assert_eq!(job.progress, 0);
        assert_eq!(jobs.get(job.id).await.unwrap().id, job.id);
    }

    #[tokio::test]
    async fn advance_follows_state_machine_and_monotonic_progress() {
        let jobs = store();
        let job = jobs.register("a.png".to_string(), MediaKind::Image).await;

        // Skipping compressing is not a valid transition.
        jobs.advance(job.id, UploadStatus::Uploading, 30).await;
        assert_eq!(jobs.get(job.id).await.unwrap().status, UploadStatus::Waiting);

        jobs.advance(job.id, UploadStatus::Compressing, 10).await;
        jobs.advance(job.id, UploadStatus::Uploading, 60).await;
        // A late, lower progress report must not move the bar backwards.
        jobs.advance(job.id, UploadStatus::Uploading, 30).await;
        let current = jobs.get(job.id).await.unwrap();
        assert_eq!(current.status, UploadStatus::Uploading);
        assert_eq!(current.progress, 60);
    }

    #[tokio::test]
    async fn terminal_status_is_sticky() {
        let jobs = store();
        let job = jobs.register("a.png".to_string(), MediaKind::Image).await;
        jobs.advance(job.id, UploadStatus::Compressing, 10).await;
        jobs.advance(job.id, UploadStatus::Uploading, 30).await;
        jobs.complete(job.id, "https://cdn/a.png".to_string()).await;

        jobs.fail(job.id, "late failure".to_string()).await;
        jobs.advance(job.id, UploadStatus::Uploading, 50).await;
        let current = jobs.get(job.id).await.unwrap();
        assert_eq!(current.status, UploadStatus::Completed);
        assert_eq!(current.url.as_deref(), Some("https://cdn/a.png"));
        assert!(current.error.is_none());
    }

    #[tokio::test]
    async fn cancel_fires_token_and_deletes_temp_files() {
        let jobs = store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.tmp");
        tokio::fs::write(&path, b"bytes").await.unwrap();

        let job = jobs.register("a.mp4".to_string(), MediaKind::Video).await;
        jobs.add_temp_resource(job.id, path.clone()).await;
        let token = jobs.cancel_token(job.id).await.unwrap();

        let cancelled = jobs.cancel(job.id).await.unwrap();
        assert_eq!(cancelled.status, UploadStatus::Cancelled);
        assert_eq!(cancelled.error.as_deref(), Some("Upload cancelled by user"));
        assert!(token.is_cancelled());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn cancel_of_terminal_job_is_noop() {
        let jobs = store();
        let job = jobs.register("a.png".to_string(), MediaKind::Image).await;
        jobs.advance(job.id, UploadStatus::Compressing, 10).await;
        jobs.advance(job.id, UploadStatus::Uploading, 30).await;
        jobs.complete(job.id, "https://cdn/a.png".to_string()).await;

        let after = jobs.cancel(job.id).await.unwrap();
        assert_eq!(after.status, UploadStatus::Completed);
        assert_eq!(after.url.as_deref(), Some("https://cdn/a.png"));
        let token = jobs.cancel_token(job.id).await.unwrap();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_unknown_job_is_none() {
        let jobs = store();
        assert!(jobs.cancel(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn temp_cleanup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.tmp");
        tokio::fs::write(&path, b"x").await.unwrap();
        cleanup_temp_resources(&[path.clone()]).await;
        // Second pass over an already-deleted path must not blow up.
        cleanup_temp_resources(&[path]).await;
    }

    #[tokio::test]
    async fn sweep_evicts_only_expired_jobs_and_their_files() {
        let jobs = JobStore::new(Duration::from_secs(60));
        let dir = tempfile::tempdir().unwrap();

        let old = jobs.register("old.png".to_string(), MediaKind::Image).await;
        let old_path = dir.path().join("old.tmp");
        tokio::fs::write(&old_path, b"x").await.unwrap();
        jobs.add_temp_resource(old.id, old_path.clone()).await;
        jobs.backdate(old.id, Duration::from_secs(120)).await;

        let young = jobs.register("new.png".to_string(), MediaKind::Image).await;

        jobs.sweep().await;

        assert!(jobs.get(old.id).await.is_none());
        assert!(!old_path.exists());
        assert!(jobs.get(young.id).await.is_some());
        assert_eq!(jobs.len().await, 1);
    }
}
