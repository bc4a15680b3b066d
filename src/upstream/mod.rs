//! Upstream CDN access.
//!
//! Content identifiers are never treated as paths: each one is decoded exactly
//! once and pushed as a single path segment onto the fixed template
//! `https://<cdn_host>/images/<project_id>/<dataset>/<id>`.

pub mod client;
pub mod error;

pub use client::{FetchedImage, HttpUpstreamClient, UpstreamClient};
pub use error::{ResolveError, UpstreamError};

use reqwest::Url;

use crate::config::UpstreamConfig;
use crate::constants::UPSTREAM_WIDTH_PARAM;

/// Build the CDN URL for a raw (still percent-encoded) content identifier.
///
/// The identifier is decoded as a form value: `+` is a space and `%2B` a
/// literal plus, the same way browsers and `URLSearchParams` read query
/// strings.
pub fn resolve_upstream_url(
    content_id: &str,
    width: Option<u32>,
    upstream: &UpstreamConfig,
) -> Result<Url, ResolveError> {
    if content_id.trim().is_empty() {
        return Err(ResolveError::EmptyId);
    }

    let form_value = content_id.replace('+', " ");
    let decoded = urlencoding::decode(&form_value).map_err(|_| ResolveError::InvalidEncoding)?;
    validate_decoded_id(&decoded)?;

    let base = format!(
        "https://{}/images/{}/{}",
        upstream.cdn_host, upstream.project_id, upstream.dataset
    );
    let mut url = Url::parse(&base).map_err(|e| ResolveError::InvalidBase(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| ResolveError::InvalidBase(base.clone()))?
        .push(&decoded);

    if let Some(width) = width {
        url.query_pairs_mut()
            .append_pair(UPSTREAM_WIDTH_PARAM, &width.to_string());
    }

    Ok(url)
}

fn validate_decoded_id(id: &str) -> Result<(), ResolveError> {
    let has_structure = id.trim().is_empty()
        || id == "."
        || id == ".."
        || id
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control());

    if has_structure {
        return Err(ResolveError::InvalidId(id.to_string()));
    }
    Ok(())
}
