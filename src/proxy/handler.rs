//! Image endpoint handler.
//!
//! Runs one request through the access guard, identifier checks and the
//! fetch-and-transform pipeline, and turns the outcome into an
//! [`EndpointResponse`]. Nothing here touches the Pingora session, so the
//! whole flow can be driven directly in tests.

use std::time::Instant;

use super::helpers::query_param;
use super::special_endpoints::{
    handle_health, handle_method_not_allowed, handle_not_found, EndpointResponse,
};
use crate::access::{evaluate, AccessDecision, OriginHeaders};
use crate::constants::HEALTH_PATH;
use crate::error::{ImageProxyError, MSG_INVALID_WIDTH, MSG_MISSING_ID};
use crate::pipeline::{fetch_and_transform, RequestContext};
use crate::reload::LoadedConfig;
use crate::upstream::{resolve_upstream_url, UpstreamClient};

/// What the image endpoint reads from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRequest {
    /// `id` query parameter, still percent-encoded
    pub content_id: Option<String>,
    /// `width` query parameter, unparsed
    pub width: Option<String>,
    /// `debug=true` was on the query string
    pub debug: bool,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub host: Option<String>,
}

impl ImageRequest {
    /// Build from the raw query string and the consulted headers.
    pub fn from_parts(
        query: Option<&str>,
        origin: Option<&str>,
        referer: Option<&str>,
        host: Option<&str>,
    ) -> Self {
        Self {
            content_id: query_param(query, "id").map(str::to_string),
            width: query_param(query, "width").map(str::to_string),
            debug: query_param(query, "debug") == Some("true"),
            origin: origin.map(str::to_string),
            referer: referer.map(str::to_string),
            host: host.map(str::to_string),
        }
    }

    pub fn origin_headers(&self) -> OriginHeaders<'_> {
        OriginHeaders {
            origin: self.origin.as_deref(),
            referer: self.referer.as_deref(),
            host: self.host.as_deref(),
        }
    }

    /// The `id` parameter, or 400 when it is missing or empty.
    pub fn required_id(&self) -> Result<&str, ImageProxyError> {
        self.content_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ImageProxyError::BadRequest(MSG_MISSING_ID))
    }

    /// The `width` parameter. Absent or empty means no resize.
    pub fn parsed_width(&self) -> Result<Option<u32>, ImageProxyError> {
        match self.width.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => parse_width(raw).map(Some),
        }
    }
}

/// Parse a positive integer width. Signs, decimals and zero are rejected.
pub fn parse_width(raw: &str) -> Result<u32, ImageProxyError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ImageProxyError::BadRequest(MSG_INVALID_WIDTH));
    }
    match raw.parse::<u32>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(ImageProxyError::BadRequest(MSG_INVALID_WIDTH)),
    }
}

/// Route a request to the endpoint serving `path`.
pub async fn dispatch(
    method: &str,
    path: &str,
    request: &ImageRequest,
    loaded: &LoadedConfig,
    client: &dyn UpstreamClient,
    start_time: Instant,
    ctx: &mut RequestContext,
) -> EndpointResponse {
    let is_read = method == "GET" || method == "HEAD";

    if path == HEALTH_PATH {
        return if is_read {
            handle_health(start_time)
        } else {
            handle_method_not_allowed()
        };
    }

    if path != loaded.config.server.image_path {
        return handle_not_found();
    }

    if !is_read {
        return handle_method_not_allowed();
    }

    handle_image_request(request, loaded, client, ctx).await
}

/// Serve one image request.
pub async fn handle_image_request(
    request: &ImageRequest,
    loaded: &LoadedConfig,
    client: &dyn UpstreamClient,
    ctx: &mut RequestContext,
) -> EndpointResponse {
    let config = &loaded.config;
    let decision = evaluate(request.origin_headers(), &loaded.allow_list);

    if request.debug && config.access.debug {
        return debug_response(&decision);
    }

    if !decision.allowed {
        tracing::warn!(
            request_id = %ctx.request_id(),
            source = ?decision.source,
            candidate = decision.candidate.as_deref().unwrap_or(""),
            "Request rejected by access guard"
        );
        return EndpointResponse::error(&ImageProxyError::Forbidden);
    }

    match serve_image(request, loaded, client, ctx).await {
        Ok(response) => with_cors_headers(response, &decision, loaded),
        Err(err) => {
            match &err {
                ImageProxyError::UpstreamFailure(detail)
                | ImageProxyError::TransformFailure(detail) => {
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        content_id = ctx.content_id().unwrap_or(""),
                        error = %detail,
                        "Image request failed"
                    );
                }
                other => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        error = %other,
                        "Image request rejected"
                    );
                }
            }
            EndpointResponse::error(&err)
        }
    }
}

async fn serve_image(
    request: &ImageRequest,
    loaded: &LoadedConfig,
    client: &dyn UpstreamClient,
    ctx: &mut RequestContext,
) -> Result<EndpointResponse, ImageProxyError> {
    let config = &loaded.config;

    let content_id = request.required_id()?;
    ctx.set_content_id(content_id);
    let width = request.parsed_width()?;

    let url = resolve_upstream_url(content_id, width, &config.upstream)?;
    tracing::debug!(
        request_id = %ctx.request_id(),
        upstream_url = %url,
        "Fetching source image"
    );

    let transformed =
        fetch_and_transform(client, &url, config.upstream.timeout(), &config.watermark).await?;
    ctx.set_watermark(transformed.watermark);

    Ok(
        EndpointResponse::image(transformed.content_type, transformed.bytes)
            .with_header("Cache-Control", config.server.cache_control()),
    )
}

/// Add `Access-Control-Allow-Origin` (never `*`) and `Vary: Origin`.
///
/// The validated request origin is echoed; otherwise the first fixed
/// allow-list origin is used, if there is one. `Vary: Origin` goes on every
/// response carrying the header, since the chosen value depends on the
/// request's Origin.
fn with_cors_headers(
    response: EndpointResponse,
    decision: &AccessDecision,
    loaded: &LoadedConfig,
) -> EndpointResponse {
    let origin = decision
        .allowed_origin()
        .or_else(|| loaded.allow_list.fixed_cors_origin());
    match origin {
        Some(origin) => response
            .with_header("Access-Control-Allow-Origin", origin)
            .with_header("Vary", "Origin"),
        None => response,
    }
}

fn debug_response(decision: &AccessDecision) -> EndpointResponse {
    let status = if decision.allowed { 200 } else { 403 };
    let body = serde_json::to_string(decision)
        .unwrap_or_else(|_| serde_json::json!({ "allowed": decision.allowed }).to_string());
    EndpointResponse::json(status, body).with_header("Cache-Control", "no-store")
}
