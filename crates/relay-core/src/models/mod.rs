//! Domain models shared across crates.

mod job;

pub use job::{
    CancelUploadResponse, InitUploadRequest, InitUploadResponse, MediaKind, UploadFileResponse,
    UploadJob, UploadStatus,
};
