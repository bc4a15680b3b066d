//! Access guard for the image endpoint.
//!
//! Decides whether a request may be served based on where it claims to come
//! from. The candidate is taken from the `Origin` header, then `Referer`
//! (reduced to its origin), and finally the `Host` header. The candidate is
//! tested against the configured [`AllowList`]; the first matching entry wins.
//!
//! # Matching
//!
//! - Origin/Referer candidates are compared to the full entry
//!   (`scheme://host[:port]`), or to the authority for host-only entries.
//! - Host candidates are compared to the host portion of every entry, ignoring
//!   the scheme.
//! - `*` matches any run of characters, see [`pattern::wildcard_match`].
//!
//! # Example
//!
//! ```
//! use gallery_proxy::access::{is_allowed, AllowList};
//!
//! let list = AllowList::from_patterns(&["https://*.example.com"]);
//! assert!(is_allowed(Some("https://a.example.com"), None, &list));
//! assert!(!is_allowed(Some("https://example.com"), None, &list));
//! assert!(is_allowed(None, Some("a.example.com"), &list));
//! ```

pub mod entry;
pub mod error;
pub mod pattern;

pub use entry::{AllowList, AllowListEntry, SkippedEntry};
pub use error::AccessError;

use serde::Serialize;

/// The request headers the guard looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginHeaders<'a> {
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub host: Option<&'a str>,
}

/// Which header produced the candidate that was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Origin,
    Referer,
    Host,
    None,
}

/// Result of testing one allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCheck {
    pub entry: String,
    pub matched: bool,
}

/// Full trace of an access decision.
///
/// Served as JSON in debug mode; otherwise only `allowed` and the candidate
/// are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub source: CandidateSource,
    pub candidate: Option<String>,
    pub matched_entry: Option<String>,
    pub checks: Vec<EntryCheck>,
    pub skipped_entries: Vec<SkippedEntry>,
}

impl AccessDecision {
    /// The validated origin, usable as a CORS origin.
    ///
    /// Only set when the request was allowed on its Origin or Referer.
    pub fn allowed_origin(&self) -> Option<&str> {
        match (self.allowed, self.source) {
            (true, CandidateSource::Origin | CandidateSource::Referer) => {
                self.candidate.as_deref()
            }
            _ => None,
        }
    }
}

/// Evaluate the request headers against the allow-list and keep the trace.
pub fn evaluate(headers: OriginHeaders<'_>, allow_list: &AllowList) -> AccessDecision {
    let origin_candidate = non_empty(headers.origin)
        .map(|o| (CandidateSource::Origin, normalize(o)))
        .or_else(|| {
            non_empty(headers.referer).map(|r| (CandidateSource::Referer, referer_origin(r)))
        });

    let (source, candidate) = match origin_candidate {
        Some((source, candidate)) => (source, Some(candidate)),
        None => match non_empty(headers.host) {
            Some(host) => (CandidateSource::Host, Some(normalize(host))),
            None => (CandidateSource::None, None),
        },
    };

    let mut checks = Vec::new();
    let mut matched_entry = None;

    if let Some(candidate) = candidate.as_deref() {
        for entry in allow_list.entries() {
            let matched = match source {
                CandidateSource::Host => entry.matches_host(candidate),
                _ => entry.matches_origin(candidate),
            };
            checks.push(EntryCheck {
                entry: entry.pattern().to_string(),
                matched,
            });
            if matched {
                matched_entry = Some(entry.pattern().to_string());
                break;
            }
        }
    }

    AccessDecision {
        allowed: matched_entry.is_some(),
        source,
        candidate,
        matched_entry,
        checks,
        skipped_entries: allow_list.skipped().to_vec(),
    }
}

/// Boolean form of the guard.
///
/// `request_origin` is the Origin header value (or the Referer when there is
/// no Origin); `request_host` is only consulted when it is absent.
pub fn is_allowed(
    request_origin: Option<&str>,
    request_host: Option<&str>,
    allow_list: &AllowList,
) -> bool {
    let headers = OriginHeaders {
        origin: request_origin,
        referer: None,
        host: request_host,
    };
    evaluate(headers, allow_list).allowed
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Lower-case and strip a single trailing slash.
fn normalize(value: &str) -> String {
    let lowered = value.trim().to_ascii_lowercase();
    match lowered.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Reduce a Referer URL to `scheme://authority`.
///
/// Values without a scheme are only normalized.
fn referer_origin(referer: &str) -> String {
    let normalized = normalize(referer);
    match normalized.split_once("://") {
        Some((scheme, rest)) => {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            format!("{}://{}", scheme, &rest[..end])
        }
        None => normalized,
    }
}
