//! Image ingestion gate.
//!
//! Uploads at or under [`MAX_UPLOAD_BYTES`] are stored as-is. Larger ones are
//! shrunk to [`MAX_WIDTH`] and re-encoded as JPEG; if that fails the original
//! bytes are kept. Every ingestion gets a fresh file name.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{info, warn};
use uuid::Uuid;

/// 2 MiB. Anything above is recompressed.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_WIDTH: u32 = 1920;
pub const JPEG_QUALITY: u8 = 80;
pub const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// Lossy re-encoder used for oversized uploads.
pub trait Recompressor: Send + Sync {
    fn recompress(&self, bytes: &[u8]) -> Result<Vec<u8>, IngestError>;
    /// Canonical extension of the output format.
    fn extension(&self) -> &'static str;
}

/// Width-bounded JPEG re-encode.
pub struct JpegRecompressor {
    pub max_width: u32,
    pub quality: u8,
}

impl Default for JpegRecompressor {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            quality: JPEG_QUALITY,
        }
    }
}

impl JpegRecompressor {
    /// Scale down to `max_width` keeping aspect ratio; never upscale.
    fn constrain_width(&self, img: DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width <= self.max_width {
            return img;
        }

        let ratio = self.max_width as f64 / width as f64;
        let new_height = ((height as f64 * ratio).round() as u32).max(1);
        img.resize_exact(self.max_width, new_height, FilterType::Lanczos3)
    }
}

impl Recompressor for JpegRecompressor {
    fn recompress(&self, bytes: &[u8]) -> Result<Vec<u8>, IngestError> {
        let img = image::load_from_memory(bytes).map_err(IngestError::Decode)?;
        let resized = self.constrain_width(img);
        // JPEG has no alpha channel
        let rgb = resized.to_rgb8();

        let mut out = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&rgb)
            .map_err(IngestError::Encode)?;
        Ok(out.into_inner())
    }

    fn extension(&self) -> &'static str {
        "jpg"
    }
}

/// What gets written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
    pub file_name: String,
}

pub struct ImageGate {
    max_bytes: usize,
    recompressor: Box<dyn Recompressor>,
}

impl Default for ImageGate {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES, Box::new(JpegRecompressor::default()))
    }
}

impl ImageGate {
    pub fn new(max_bytes: usize, recompressor: Box<dyn Recompressor>) -> Self {
        Self {
            max_bytes,
            recompressor,
        }
    }

    /// Normalize a declared extension: lowercase, defaulting to `jpg`.
    /// The extension is trusted as declared; content is not sniffed.
    pub fn declared_extension(file_name: Option<&str>) -> String {
        file_name
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }

    pub fn ingest(&self, bytes: Vec<u8>, declared_extension: &str) -> IngestedImage {
        let original_len = bytes.len();

        let (bytes, extension) = if original_len <= self.max_bytes {
            (bytes, declared_extension.to_string())
        } else {
            match self.recompressor.recompress(&bytes) {
                Ok(compressed) => {
                    info!(
                        "Image compressed. Original size: {}, new size: {}",
                        original_len,
                        compressed.len()
                    );
                    (compressed, self.recompressor.extension().to_string())
                }
                Err(e) => {
                    warn!("Compression failed, keeping original upload: {}", e);
                    (bytes, declared_extension.to_string())
                }
            }
        };

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        IngestedImage {
            bytes,
            extension,
            file_name,
        }
    }
}
