//! Image recompression: decode, downscale to a bounding edge, re-encode JPEG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::GenericImageView;
use tokio_util::sync::CancellationToken;

use crate::ProcessingError;

#[derive(Clone, Debug)]
pub struct ImageCompressor {
    max_edge: u32,
    jpeg_quality: u8,
}

impl ImageCompressor {
    pub fn new(max_edge: u32, jpeg_quality: u8) -> Self {
        Self {
            max_edge,
            jpeg_quality,
        }
    }

    /// Recompress the image, preserving aspect ratio within `max_edge`.
    ///
    /// Decoding and encoding are CPU-bound, so the work runs under
    /// `spawn_blocking`; cancellation is observed before the blocking
    /// section starts and again before the result is used.
    #[tracing::instrument(skip(self, data, cancel), fields(input_size = data.len()))]
    pub async fn compress(
        &self,
        data: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ProcessingError> {
        if cancel.is_cancelled() {
            return Err(ProcessingError::Cancelled);
        }

        let max_edge = self.max_edge;
        let quality = self.jpeg_quality;
        let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ProcessingError> {
            let img = image::ImageReader::new(Cursor::new(&data))
                .with_guessed_format()
                .map_err(|e| ProcessingError::Image(e.to_string()))?
                .decode()
                .map_err(|e| ProcessingError::Image(e.to_string()))?;

            let (width, height) = img.dimensions();
            let img = if width > max_edge || height > max_edge {
                img.resize(max_edge, max_edge, FilterType::Lanczos3)
            } else {
                img
            };

            let mut buffer = Vec::new();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
            img.write_with_encoder(encoder)
                .map_err(|e| ProcessingError::Image(e.to_string()))?;
            Ok(buffer)
        })
        .await
        .map_err(|e| ProcessingError::Image(format!("compression task panicked: {}", e)))??;

        if cancel.is_cancelled() {
            return Err(ProcessingError::Cancelled);
        }

        tracing::debug!(output_size = result.len(), "Image recompressed");
        Ok(result)
    }
}
