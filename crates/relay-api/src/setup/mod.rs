//! Application setup and initialization
//!
//! Wires the configuration into the platform client, tracker, and driver,
//! builds the router, and spawns the retention sweeper.

pub mod routes;
pub mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::RelayConfig;
use relay_processing::{ImageCompressor, VideoTranscoder};
use relay_shopify::{PlatformClient, ShopifyClient};

use crate::services::tracker::JobStore;
use crate::services::upload::UploadDriver;
use crate::state::AppState;

/// Initialize the entire application against the real platform client.
pub async fn initialize_app(config: RelayConfig) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration.
    config
        .validate()
        .context("Configuration validation failed")?;

    let client = ShopifyClient::new(&config).context("Failed to build platform client")?;
    let state = build_state(config, Arc::new(client)).await?;

    // Hourly eviction of expired jobs; the task runs for the process lifetime.
    let _sweeper = state.jobs.clone().start_sweeper(state.config.sweep_interval);

    let router = routes::setup_routes(&state.config, state.clone())?;
    tracing::info!("Application initialized");

    Ok((state, router))
}

/// Assemble state from a configuration and any platform client. Integration
/// tests call this directly with a mock client and no sweeper.
pub async fn build_state(
    config: RelayConfig,
    platform: Arc<dyn PlatformClient>,
) -> Result<Arc<AppState>> {
    let temp_dir = PathBuf::from(&config.temp_dir);
    tokio::fs::create_dir_all(&temp_dir)
        .await
        .with_context(|| format!("Failed to create temp dir {}", config.temp_dir))?;

    crate::error::set_production_mode(config.is_production());

    let jobs = JobStore::new(config.job_retention);
    let compressor = ImageCompressor::new(config.image_max_edge, config.image_jpeg_quality);
    let transcoder = if config.ffmpeg_path.is_empty() {
        None
    } else {
        Some(
            VideoTranscoder::new(config.ffmpeg_path.clone())
                .context("Invalid ffmpeg path")?,
        )
    };

    let driver = UploadDriver::new(
        jobs.clone(),
        platform.clone(),
        compressor,
        transcoder,
        temp_dir,
        config.poll_interval,
        config.poll_max_attempts,
    );

    Ok(Arc::new(AppState {
        config,
        jobs,
        platform,
        driver,
    }))
}
