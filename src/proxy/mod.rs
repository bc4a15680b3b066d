// Proxy module - Pingora ProxyHttp implementation
// Every request is answered locally in request_filter; there is no proxied upstream peer

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub mod handler;
pub mod helpers;
pub mod special_endpoints;

pub use handler::{dispatch, handle_image_request, ImageRequest};
pub use special_endpoints::EndpointResponse;

use crate::config::Config;
use crate::pipeline::RequestContext;
use crate::reload::{ConfigHandle, ReloadManager};
use crate::upstream::UpstreamClient;
use helpers::{get_client_ip, header_value, request_host};

/// GalleryProxy implements the Pingora ProxyHttp trait
/// Serves watermarked gallery images, guarded by the origin allow-list
pub struct GalleryProxy {
    config: Arc<ConfigHandle>,
    client: Arc<dyn UpstreamClient>,
    reload_manager: Option<Arc<ReloadManager>>,
    /// Proxy start time (for uptime calculation in /health endpoint)
    start_time: Instant,
}

impl GalleryProxy {
    pub fn new(config: Config, client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            config: Arc::new(ConfigHandle::new(config)),
            client,
            reload_manager: None,
            start_time: Instant::now(),
        }
    }

    /// Create a GalleryProxy that reloads `config_path` after SIGHUP
    pub fn with_reload(
        config: Config,
        config_path: PathBuf,
        client: Arc<dyn UpstreamClient>,
    ) -> Self {
        let mut proxy = Self::new(config, client);
        proxy.reload_manager = Some(Arc::new(ReloadManager::new(config_path)));
        proxy
    }

    pub fn config_handle(&self) -> Arc<ConfigHandle> {
        Arc::clone(&self.config)
    }

    pub fn reload_manager(&self) -> Option<Arc<ReloadManager>> {
        self.reload_manager.clone()
    }

    /// Apply a pending SIGHUP reload. A failed reload keeps the current config.
    fn reload_if_requested(&self) {
        let Some(manager) = &self.reload_manager else {
            return;
        };
        if !manager.take_reload_request() {
            return;
        }

        let old_generation = self.config.current().config.generation;
        match manager.reload_into(&self.config) {
            Ok(new_generation) => tracing::info!(
                old_generation = old_generation,
                new_generation = new_generation,
                path = %manager.config_path().display(),
                "Configuration reloaded successfully"
            ),
            Err(error) => tracing::error!(
                error = %error,
                path = %manager.config_path().display(),
                "Configuration reload failed, keeping current configuration"
            ),
        }
    }

    async fn write_response(
        session: &mut Session,
        response: EndpointResponse,
        ctx: &RequestContext,
        head_only: bool,
    ) -> Result<()> {
        let mut header = ResponseHeader::build(response.status, None)?;
        header.insert_header("Content-Type", response.content_type.as_str())?;
        header.insert_header("Content-Length", response.body.len().to_string())?;
        for (name, value) in &response.headers {
            header.insert_header(*name, value.as_str())?;
        }
        header.insert_header("X-Request-ID", ctx.request_id())?;

        session
            .write_response_header(Box::new(header), head_only)
            .await?;
        if !head_only {
            session
                .write_response_body(Some(response.body), true)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProxyHttp for GalleryProxy {
    type CTX = RequestContext;

    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new("GET".to_string(), "/".to_string())
    }

    /// Never reached: request_filter answers every request
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "GalleryProxy serves all requests locally",
        ))
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        self.reload_if_requested();
        let loaded = self.config.current();

        let req = session.req_header();
        let method = req.method.as_str().to_string();
        let path = req.uri.path().to_string();
        let request = ImageRequest::from_parts(
            req.uri.query(),
            header_value(req, "origin"),
            header_value(req, "referer"),
            request_host(req),
        );
        ctx.set_request_line(&method, &path);

        let response = dispatch(
            &method,
            &path,
            &request,
            &loaded,
            self.client.as_ref(),
            self.start_time,
            ctx,
        )
        .await;

        Self::write_response(session, response, ctx, method == "HEAD").await?;
        Ok(true)
    }

    /// Log request completion
    async fn logging(
        &self,
        session: &mut Session,
        _e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = session
            .response_written()
            .map(|resp| resp.status.as_u16())
            .unwrap_or(500);
        let client_ip = get_client_ip(session);
        let duration_ms = ctx.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            request_id = %ctx.request_id(),
            timestamp = ctx.timestamp(),
            client_ip = %client_ip,
            method = %ctx.method(),
            path = %ctx.path(),
            content_id = ctx.content_id().unwrap_or(""),
            watermark = ctx.watermark().unwrap_or("none"),
            status_code = status_code,
            duration_ms = duration_ms,
            "Request completed"
        );
    }
}
