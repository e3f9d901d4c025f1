//! Image source resolution
//!
//! Turns an [`ImageRef`] into raw bytes plus a MIME type: inline `data:`
//! references are decoded locally, anything else is fetched with one GET.

use base64::Engine;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::state::data::ImageRef;

/// Used when neither the source nor the bytes reveal a type
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Raw image bytes ready to be sent to the generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SourceImage {
    /// Pick the declared type when it names an image, else sniff the bytes
    pub fn new(bytes: Vec<u8>, declared: Option<&str>) -> Self {
        let mime_type = declared
            .filter(|mime| mime.starts_with("image/"))
            .map(str::to_string)
            .or_else(|| sniff_mime_type(&bytes))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Self { bytes, mime_type }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("image request returned {0}")]
    Status(StatusCode),

    #[error("malformed data reference")]
    MalformedDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image is empty")]
    Empty,
}

/// Resolve `image` to bytes, fetching it if it is a remote reference
pub async fn resolve(client: &Client, image: &ImageRef) -> Result<SourceImage, SourceError> {
    if image.is_inline() {
        return decode_data_url(image.as_str());
    }

    let response = client.get(image.as_str()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_string());

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(SourceError::Empty);
    }

    debug!(image = %image, size = bytes.len(), "fetched image source");
    Ok(SourceImage::new(bytes.to_vec(), content_type.as_deref()))
}

/// Decode a `data:<mime>;base64,<payload>` reference
pub fn decode_data_url(reference: &str) -> Result<SourceImage, SourceError> {
    let rest = reference
        .strip_prefix("data:")
        .ok_or(SourceError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(SourceError::MalformedDataUrl)?;
    let header = header
        .strip_suffix(";base64")
        .ok_or(SourceError::MalformedDataUrl)?;
    let mime_type = header.split(';').next().filter(|mime| !mime.is_empty());

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(SourceError::Empty);
    }

    Ok(SourceImage::new(bytes, mime_type))
}

/// Guess an image MIME type from magic bytes
pub fn sniff_mime_type(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
