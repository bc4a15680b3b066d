// Error types module

use std::fmt;

use crate::pipeline::PipelineError;
use crate::upstream::{ResolveError, UpstreamError};

pub const MSG_MISSING_ID: &str = "Image ID is required.";
pub const MSG_INVALID_ID: &str = "Invalid image ID.";
pub const MSG_INVALID_WIDTH: &str = "Width must be a positive integer.";
pub const MSG_FORBIDDEN: &str = "Forbidden: Hotlinking not allowed.";
pub const MSG_INTERNAL: &str = "Internal Server Error";
pub const MSG_NOT_FOUND: &str = "Not Found";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Request-level error taxonomy for the image endpoint.
///
/// Every failure on the request path ends up as one of these variants and is
/// rendered as a JSON `{"error": ...}` body. Upstream and transform details
/// are kept for the server log and never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageProxyError {
    /// Missing or malformed query parameters (400)
    BadRequest(&'static str),

    /// Origin/host rejected by the access guard (403)
    Forbidden,

    /// CDN fetch failed: status, network error or timeout (500)
    UpstreamFailure(String),

    /// Source could not be decoded or the result could not be encoded (500)
    TransformFailure(String),

    /// Unknown path (404)
    NotFound,

    /// Anything but GET/HEAD (405)
    MethodNotAllowed,
}

impl ImageProxyError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::UpstreamFailure(_) | Self::TransformFailure(_) => 500,
        }
    }

    /// Message shown to the caller. Server-side details are never included.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(msg) => msg,
            Self::Forbidden => MSG_FORBIDDEN,
            Self::NotFound => MSG_NOT_FOUND,
            Self::MethodNotAllowed => MSG_METHOD_NOT_ALLOWED,
            Self::UpstreamFailure(_) | Self::TransformFailure(_) => MSG_INTERNAL,
        }
    }

    /// JSON body sent to the caller.
    pub fn to_json_body(&self) -> String {
        serde_json::json!({ "error": self.public_message() }).to_string()
    }
}

impl fmt::Display for ImageProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Forbidden => write!(f, "Forbidden: origin not in allow-list"),
            Self::UpstreamFailure(msg) => write!(f, "Upstream failure: {}", msg),
            Self::TransformFailure(msg) => write!(f, "Transform failure: {}", msg),
            Self::NotFound => write!(f, "Not found"),
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
        }
    }
}

impl std::error::Error for ImageProxyError {}

impl From<ResolveError> for ImageProxyError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidBase(msg) => Self::UpstreamFailure(msg),
            _ => Self::BadRequest(MSG_INVALID_ID),
        }
    }
}

impl From<UpstreamError> for ImageProxyError {
    fn from(err: UpstreamError) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}

impl From<PipelineError> for ImageProxyError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Upstream(e) => Self::UpstreamFailure(e.to_string()),
            other => Self::TransformFailure(other.to_string()),
        }
    }
}
