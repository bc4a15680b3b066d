//! Outbound HTTP client for the CDN.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::time::Duration;

use super::UpstreamError;
use crate::constants::DEFAULT_MAX_UPSTREAM_BODY_BYTES;

/// Raw bytes and declared content type of a fetched source image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Fetches source images. One call is one GET; implementations never retry.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedImage, UpstreamError>;
}

/// `reqwest` implementation of [`UpstreamClient`].
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpUpstreamClient {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_UPSTREAM_BODY_BYTES,
        })
    }

    /// Cap the number of body bytes read per fetch.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Read the body, failing as soon as it grows past the limit.
    async fn read_body(
        &self,
        url: &Url,
        mut response: reqwest::Response,
    ) -> Result<Bytes, UpstreamError> {
        let too_large = || UpstreamError::TooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        };

        let declared = response.content_length().unwrap_or(0);
        if declared > self.max_body_bytes as u64 {
            return Err(too_large());
        }

        let mut body = BytesMut::with_capacity(declared as usize);
        while let Some(chunk) = response.chunk().await.map_err(|e| body_error(url, e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

fn body_error(url: &Url, err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            url: url.to_string(),
        }
    } else {
        UpstreamError::Body {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

fn request_error(url: &Url, err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            url: url.to_string(),
        }
    } else {
        UpstreamError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedImage, UpstreamError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = self.read_body(url, response).await?;

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
