//! Upload relay API library
//!
//! This crate provides the HTTP handlers, the upload job tracker, the
//! staged-upload driver, and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use services::tracker::JobStore;
pub use services::upload::UploadDriver;
pub use telemetry::init_telemetry;
