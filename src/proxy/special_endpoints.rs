//! Response values for every endpoint the proxy serves.
//!
//! Handlers return an `EndpointResponse` instead of writing directly to the
//! session. This keeps response generation testable; the caller writes the
//! response to the session.

use bytes::Bytes;
use std::time::Instant;

use crate::error::ImageProxyError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// A complete response: status, headers and body.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: u16,
    pub content_type: String,
    /// Headers besides Content-Type and Content-Length
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

impl EndpointResponse {
    /// JSON response with the given status and body.
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: JSON_CONTENT_TYPE.to_string(),
            headers: Vec::new(),
            body: Bytes::from(body),
        }
    }

    /// Image response.
    pub fn image(content_type: String, body: Bytes) -> Self {
        Self {
            status: 200,
            content_type,
            headers: Vec::new(),
            body,
        }
    }

    /// JSON `{"error": ...}` response for a request error.
    pub fn error(err: &ImageProxyError) -> Self {
        Self::json(err.status_code(), err.to_json_body())
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// First value of header `name` (case-insensitive), Content-Type included.
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("content-type") {
            return Some(&self.content_type);
        }
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Generate response for /health endpoint.
pub fn handle_health(start_time: Instant) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION")
    })
    .to_string();

    EndpointResponse::json(200, body)
}

pub fn handle_not_found() -> EndpointResponse {
    EndpointResponse::error(&ImageProxyError::NotFound)
}

pub fn handle_method_not_allowed() -> EndpointResponse {
    EndpointResponse::error(&ImageProxyError::MethodNotAllowed).with_header("Allow", "GET, HEAD")
}
