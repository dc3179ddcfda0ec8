//! Local media transformation for the upload relay.
//!
//! Images are recompressed in-process with the `image` crate; videos are
//! handed to ffmpeg as an external process. Both paths are cancellation
//! aware, and both are best-effort from the caller's perspective: the
//! driver falls back to the original bytes when a transformation fails.

mod image_compress;
mod video;

pub use image_compress::ImageCompressor;
pub use video::VideoTranscoder;

/// Transformation failure. `Cancelled` aborts the upload; any other error is
/// degraded to "use the original bytes" by the driver.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("transformation cancelled")]
    Cancelled,
    #[error("image processing failed: {0}")]
    Image(String),
    #[error("transcode failed: {0}")]
    Transcode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
