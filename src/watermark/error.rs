//! Watermark error types.

use thiserror::Error;

/// Errors that can occur while producing or applying a watermark.
///
/// None of these reach the caller directly: a failing strategy hands over to
/// the next one in the chain.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Watermark asset could not be read from disk
    #[error("Failed to load watermark asset {path}: {message}")]
    AssetError { path: String, message: String },

    /// Watermark image bytes could not be decoded
    #[error("Failed to decode watermark image: {0}")]
    DecodeError(String),

    /// Text could not be rendered
    #[error("Failed to render text watermark: {0}")]
    RenderError(String),

    /// Output could not be encoded
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// Generated asset could not be written
    #[error("Failed to write watermark asset {path}: {message}")]
    WriteError { path: String, message: String },
}
