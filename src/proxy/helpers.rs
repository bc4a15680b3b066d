//! Proxy utility functions.
//!
//! This module contains helper functions for request processing:
//! - Header extraction from Pingora requests
//! - Raw query parameter lookup
//! - Client IP detection (X-Forwarded-For aware)

use pingora_http::RequestHeader;
use pingora_proxy::Session;

/// Value of a request header, if present and valid UTF-8.
pub fn header_value<'a>(req: &'a RequestHeader, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Host of the request: the `Host` header, or the URI authority (HTTP/2).
pub fn request_host(req: &RequestHeader) -> Option<&str> {
    header_value(req, "host").or_else(|| req.uri.authority().map(|a| a.as_str()))
}

/// First value of `key` in a query string, still percent-encoded.
///
/// Decoding is left to the caller so identifiers are decoded exactly once.
pub fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((k, v)) => Some((k, v)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Extract client IP address from session (X-Forwarded-For aware).
///
/// The header can contain multiple IPs: `"client, proxy1, proxy2"`.
/// The first IP is the original client, which is what we return.
pub fn get_client_ip(session: &Session) -> String {
    if let Some(forwarded_for) = header_value(session.req_header(), "x-forwarded-for") {
        if let Some(client_ip) = forwarded_for.split(',').next() {
            return client_ip.trim().to_string();
        }
    }

    session
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
