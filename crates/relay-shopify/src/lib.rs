//! Shopify Admin GraphQL client for the upload relay.
//!
//! Wraps the three operations the staged-upload driver depends on
//! (`stagedUploadsCreate`, `fileCreate`, and the `node` file-status query)
//! plus the direct blob-storage push and a raw GraphQL passthrough for the
//! admin proxy endpoint. The [`PlatformClient`] trait is the seam between
//! the driver and the network so tests can substitute a mock.

mod client;
mod error;
mod traits;
mod types;

pub use client::ShopifyClient;
pub use error::ShopifyError;
pub use traits::PlatformClient;
pub use types::{
    BlobUpload, CreatedFile, FileReadiness, StagedTarget, StagedUploadParameter,
    StagedUploadRequest,
};
