use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::path::Path;
use tracing::debug;

use crate::error::ImageError;

/// MIME declared when nothing better is known.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// An image ready to be sent inline: declared MIME type plus bare base64 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data_base64: String,
}

impl ImageInput {
    /// Accepts either a `data:<mime>;base64,<data>` URI or bare base64.
    /// Everything up to the first comma is treated as the prefix and dropped.
    pub fn from_data_uri_or_base64(encoded: &str) -> Result<Self, ImageError> {
        let (mime_type, data) = match encoded.split_once(',') {
            Some((prefix, data)) => (mime_from_prefix(prefix), data),
            None => (DEFAULT_MIME.to_string(), encoded),
        };
        let data = data.trim();
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            mime_type,
            data_base64: data.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            mime_type: sniff_mime(bytes).to_string(),
            data_base64: STANDARD.encode(bytes),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), "loaded image");
        Self::from_bytes(&bytes)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(self.data_base64.as_bytes())?)
    }
}

fn mime_from_prefix(prefix: &str) -> String {
    prefix
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_MIME)
        .to_string()
}

/// Best-effort MIME from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => DEFAULT_MIME,
    }
}
