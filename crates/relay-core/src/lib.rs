//! Core types for the upload relay: configuration, error taxonomy, and
//! domain models shared by the API, Shopify client, and processing crates.

pub mod config;
pub mod error;
pub mod models;

pub use config::RelayConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
