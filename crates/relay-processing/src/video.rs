//! Video transcoding via an external ffmpeg process.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::ProcessingError;

/// Validate that a path doesn't contain shell metacharacters or traversal.
fn validate_path(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::Transcode(format!(
            "path contains dangerous characters: {}",
            path
        )));
    }
    if path.contains("..") {
        return Err(ProcessingError::Transcode(format!(
            "path contains directory traversal: {}",
            path
        )));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct VideoTranscoder {
    ffmpeg_path: String,
}

impl VideoTranscoder {
    pub fn new(ffmpeg_path: String) -> Result<Self, ProcessingError> {
        validate_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }

    /// Transcode `input` to H.264/AAC MP4 at `output`.
    ///
    /// The ffmpeg child is killed if the cancellation token fires while it
    /// runs; `kill_on_drop` covers the process if the task itself is dropped.
    #[tracing::instrument(skip(self, cancel), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "transcode"
    ))]
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessingError> {
        validate_path(&input.to_string_lossy())?;
        validate_path(&output.to_string_lossy())?;

        if cancel.is_cancelled() {
            return Err(ProcessingError::Cancelled);
        }

        let start = std::time::Instant::now();
        let mut child = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args([
                "-c:v",
                "libx264",
                "-preset",
                "fast",
                "-crf",
                "28",
                "-c:a",
                "aac",
                "-movflags",
                "+faststart",
                "-y",
            ])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessingError::Transcode(format!("failed to spawn ffmpeg: {}", e)))?;

        let stderr = child.stderr.take();

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!("Cancellation requested, killing ffmpeg");
                let _ = child.kill().await;
                Err(ProcessingError::Cancelled)
            }
            status = child.wait() => {
                let status = status
                    .map_err(|e| ProcessingError::Transcode(format!("ffmpeg wait failed: {}", e)))?;
                if !status.success() {
                    let mut detail = String::new();
                    if let Some(mut stderr) = stderr {
                        use tokio::io::AsyncReadExt;
                        let _ = stderr.read_to_string(&mut detail).await;
                    }
                    return Err(ProcessingError::Transcode(format!(
                        "ffmpeg exited with {}: {}",
                        status,
                        detail.lines().last().unwrap_or("")
                    )));
                }
                tracing::info!(duration_ms = start.elapsed().as_millis() as u64, "Transcode completed");
                Ok(())
            }
        }
    }
}
