//! Error types for identifier resolution and upstream fetches.

use thiserror::Error;

/// Errors turning a content identifier into an upstream URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("image id is empty")]
    EmptyId,

    #[error("image id is not valid percent-encoded UTF-8")]
    InvalidEncoding,

    #[error("image id {0:?} contains path or query structure")]
    InvalidId(String),

    #[error("upstream base URL is invalid: {0}")]
    InvalidBase(String),
}

/// Errors fetching the source image from the CDN.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("GET {url} returned {status}")]
    Status { status: u16, url: String },

    #[error("GET {url} timed out")]
    Timeout { url: String },

    #[error("GET {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("reading body of {url} failed: {message}")]
    Body { url: String, message: String },

    #[error("body of {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },
}

impl UpstreamError {
    /// Upstream URL involved in the failure.
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Request { url, .. }
            | Self::Body { url, .. }
            | Self::TooLarge { url, .. } => url,
        }
    }
}
