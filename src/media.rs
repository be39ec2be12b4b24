//! Image encoding for inline multimodal requests
//!
//! Converts a local image into the base64 payload plus MIME type that Gemini
//! expects for `inlineData` parts.

use crate::models::ImageInput;
use crate::{Error, Result};
use base64::Engine as _;
use image::ImageFormat;
use std::path::Path;

/// Largest image accepted for upload (4 MiB).
pub const MAX_IMAGE_BYTES: u64 = 4 * 1024 * 1024;

pub fn validate_image_size(size: u64) -> Result<()> {
    if size > MAX_IMAGE_BYTES {
        return Err(Error::ImageTooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Validate and encode an image file.
///
/// The size check runs on file metadata, before any bytes are read.
pub async fn load_image(path: &Path) -> Result<ImageInput> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::Encoding(format!("Failed to read {}: {}", path.display(), e)))?;
    validate_image_size(metadata.len())?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Encoding(format!("Failed to read {}: {}", path.display(), e)))?;

    let mime_type = declared_mime_type(path, &bytes);
    tracing::debug!(
        "Encoding {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(encode_image(&bytes, mime_type))
}

pub fn encode_image(bytes: &[u8], mime_type: impl Into<String>) -> ImageInput {
    ImageInput {
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
        mime_type: mime_type.into(),
    }
}

/// MIME type implied by the file extension, falling back to content sniffing.
pub fn declared_mime_type(path: &Path, bytes: &[u8]) -> String {
    match ImageFormat::from_path(path) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => detect_image_mime(bytes).to_string(),
    }
}

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

impl ImageInput {
    /// Parse a `data:<mime>;base64,<payload>` URL, keeping only the payload.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::Encoding("Missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::Encoding("Missing data URL payload separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::Encoding("Data URL is not base64 encoded".to_string()))?;

        if payload.is_empty() {
            return Err(Error::Encoding("Data URL payload is empty".to_string()));
        }

        Ok(Self {
            data: payload.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}
