//! Fetch the source image and apply the watermark.

use bytes::Bytes;
use reqwest::Url;
use std::time::Duration;

use super::PipelineError;
use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::upstream::UpstreamClient;
use crate::watermark::{apply_watermark, encode_jpeg, WatermarkConfig};

const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Response body for one request.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub bytes: Bytes,
    pub content_type: String,
    /// Watermark strategy that was applied, `None` for pass-through or unmarked output
    pub watermark: Option<&'static str>,
}

/// Fetch `url` once and watermark the result.
///
/// Decoding, compositing and encoding run on the blocking thread pool.
pub async fn fetch_and_transform(
    client: &dyn UpstreamClient,
    url: &Url,
    timeout: Duration,
    watermark: &WatermarkConfig,
) -> Result<TransformedImage, PipelineError> {
    let fetched = client.fetch(url, timeout).await?;

    if !watermark.enabled {
        return Ok(TransformedImage {
            bytes: fetched.bytes,
            content_type: fetched
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            watermark: None,
        });
    }

    let config = watermark.clone();
    let source = fetched.bytes;
    tokio::task::spawn_blocking(move || transform_bytes(&source, &config))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?
}

/// Decode, watermark and re-encode as JPEG.
pub fn transform_bytes(
    source: &[u8],
    watermark: &WatermarkConfig,
) -> Result<TransformedImage, PipelineError> {
    let decoded =
        image::load_from_memory(source).map_err(|e| PipelineError::Decode(e.to_string()))?;

    let watermarked = apply_watermark(&decoded, watermark);
    let jpeg = encode_jpeg(&watermarked.image, watermark.jpeg_quality)
        .map_err(|e| PipelineError::Encode(e.to_string()))?;

    Ok(TransformedImage {
        bytes: Bytes::from(jpeg),
        content_type: JPEG_CONTENT_TYPE.to_string(),
        watermark: watermarked.strategy,
    })
}
