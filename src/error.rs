//! Error types for capture, export, upload and settings

use thiserror::Error;

/// Background image could not be established
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No image data was handed over by the capture step.
    #[error("no capture data available")]
    Missing,
    /// The image URI is not a base64 data URI.
    #[error("invalid image data URI: {0}")]
    DataUri(String),
    /// The image bytes could not be decoded.
    #[error("failed to decode captured image: {0}")]
    Decode(#[from] image::ImageError),
    /// The selection does not overlap the captured bitmap.
    #[error("selected region is empty")]
    EmptyRegion,
}

/// The rendered canvas could not be serialized
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("canvas has no background image")]
    NoSurface,
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
}

/// A single upload strategy failed; the pipeline may fall back
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("server did not report success")]
    Rejected,
    #[error("server returned no URL")]
    NoUrl,
    #[error("clipboard write failed: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// System clipboard was unavailable or rejected the data
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// Every upload strategy was exhausted
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct UploadError {
    #[from]
    pub cause: StrategyError,
}

/// Save-and-upload failed at export or upload
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Settings could not be read or written
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available")]
    NoConfigDir,
    #[error("settings file IO failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid color token: {0}")]
    InvalidColor(String),
}
