//! Image loading and validation for multimodal requests.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use mime::Mime;
use std::path::Path;
use url::Url;

use crate::error::{GenAiResult, InvalidArgumentError, NotFoundError};

/// MIME type used for images fetched from a URL.
pub const URL_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Fallback MIME type when detection fails.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Detected MIME type.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Bytes,
}

impl LoadedImage {
    /// Base64 (standard alphabet, padded) encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Reads local images.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Whether a readable file exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Reads the file and detects its MIME type.
    async fn load(&self, path: &Path) -> GenAiResult<LoadedImage>;
}

/// Filesystem-backed image loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLoader;

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn load(&self, path: &Path) -> GenAiResult<LoadedImage> {
        let data = tokio::fs::read(path).await.map_err(|_| NotFoundError::ImageFile {
            path: path.display().to_string(),
        })?;

        Ok(LoadedImage {
            mime_type: sniff_mime_type(&data, path),
            data: Bytes::from(data),
        })
    }
}

/// Detects an image MIME type from magic bytes, then the file extension.
pub fn sniff_mime_type(data: &[u8], path: &Path) -> String {
    from_magic_bytes(data)
        .or_else(|| from_extension(path))
        .map_or_else(|| DEFAULT_MIME_TYPE.to_string(), |m| m.essence_str().to_string())
}

fn image_webp() -> Option<Mime> {
    "image/webp".parse().ok()
}

fn from_magic_bytes(data: &[u8]) -> Option<Mime> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(mime::IMAGE_PNG)
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(mime::IMAGE_JPEG)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(mime::IMAGE_GIF)
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        image_webp()
    } else if data.starts_with(b"BM") {
        Some(mime::IMAGE_BMP)
    } else {
        None
    }
}

fn from_extension(path: &Path) -> Option<Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(mime::IMAGE_PNG),
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "gif" => Some(mime::IMAGE_GIF),
        "webp" => image_webp(),
        "bmp" => Some(mime::IMAGE_BMP),
        _ => None,
    }
}

/// Parses an image URL, accepting only `http` and `https`.
pub fn validate_image_url(raw: &str) -> GenAiResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| InvalidArgumentError::MalformedUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InvalidArgumentError::UnsupportedScheme {
            scheme: other.to_string(),
        }
        .into()),
    }
}
