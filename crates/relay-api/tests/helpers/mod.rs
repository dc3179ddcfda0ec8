//! Test helpers: build AppState and router against a mock platform client.
//!
//! Run from workspace root: `cargo test -p relay-api --test uploads_test` or
//! `cargo test -p relay-api`.

pub mod fixtures;
pub mod platform;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use relay_api::setup::{build_state, routes};
use relay_api::state::AppState;
use relay_core::RelayConfig;
use tempfile::TempDir;

use platform::MockPlatform;

/// Test application: server, mock platform, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub platform: Arc<MockPlatform>,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Config with millisecond polling so tests run fast.
pub fn test_config(temp_dir: &TempDir) -> RelayConfig {
    RelayConfig {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        shopify_store_domain: "test-shop.myshopify.com".to_string(),
        shopify_access_token: "shpat_test_token".to_string(),
        shopify_api_version: "2024-07".to_string(),
        max_image_size_bytes: 10 * 1024 * 1024,
        max_video_size_bytes: 100 * 1024 * 1024,
        max_file_size_bytes: 100 * 1024 * 1024,
        request_body_limit_bytes: 120 * 1024 * 1024,
        temp_dir: temp_dir.path().to_string_lossy().into_owned(),
        // No transcoder in tests; video jobs fall back to the original bytes.
        ffmpeg_path: String::new(),
        image_max_edge: 2048,
        image_jpeg_quality: 82,
        poll_interval: Duration::from_millis(10),
        poll_max_attempts: 5,
        job_retention: Duration::from_secs(3600),
        sweep_interval: Duration::from_secs(3600),
    }
}

/// Setup test app with the given mock platform. No sweeper is spawned.
pub async fn setup_test_app(platform: Arc<MockPlatform>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);

    let state = build_state(config.clone(), platform.clone())
        .await
        .expect("Failed to build state");
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        platform,
        state,
        _temp_dir: temp_dir,
    }
}
