//! Error types for the fetch-and-transform pipeline.

use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Upstream body is not a decodable image
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode watermarked image: {0}")]
    Encode(String),

    /// Blocking transform task panicked or was cancelled
    #[error("Transform task failed: {0}")]
    Join(String),
}
