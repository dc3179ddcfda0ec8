//! Application state.
//!
//! A single Arc-shared state: the loaded configuration, the in-memory job
//! tracker, the platform client behind its trait object, and the driver
//! that runs the staged-upload protocol. Handlers receive `Arc<AppState>`
//! via Axum's `State` extractor.

use std::sync::Arc;

use relay_core::RelayConfig;
use relay_shopify::PlatformClient;

use crate::services::tracker::JobStore;
use crate::services::upload::UploadDriver;

#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub jobs: JobStore,
    pub platform: Arc<dyn PlatformClient>,
    pub driver: UploadDriver,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
