// Request pipeline module - per-request context and the fetch-and-transform stage

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod error;
pub mod transform;

pub use error::PipelineError;
pub use transform::{fetch_and_transform, transform_bytes, TransformedImage};

/// Information about one HTTP request as it moves through the proxy.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    timestamp: u64,
    started_at: Instant,
    content_id: Option<String>,
    watermark: Option<&'static str>,
}

impl RequestContext {
    /// Create a context with a fresh UUID v4 request ID.
    pub fn new(method: String, path: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            started_at: Instant::now(),
            content_id: None,
            watermark: None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request timestamp (Unix epoch seconds)
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Update method and path once the request header is known.
    pub fn set_request_line(&mut self, method: &str, path: &str) {
        self.method = method.to_string();
        self.path = path.to_string();
    }

    pub fn set_content_id(&mut self, content_id: &str) {
        self.content_id = Some(content_id.to_string());
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn set_watermark(&mut self, strategy: Option<&'static str>) {
        self.watermark = strategy;
    }

    pub fn watermark(&self) -> Option<&'static str> {
        self.watermark
    }
}
