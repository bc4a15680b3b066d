//! Allow-list entries and the parsed allow-list.

use serde::Serialize;

use super::error::AccessError;
use super::pattern::wildcard_match;

const SCHEME_SEPARATOR: &str = "://";

/// A single parsed allow-list pattern.
///
/// Entries either carry a scheme (`https://*.example.com`) or are host-only
/// (`*.example.com`, `localhost:3000`). Both forms are lower-cased and have a
/// single trailing slash removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListEntry {
    pattern: String,
    scheme: Option<String>,
    host: String,
}

impl AllowListEntry {
    /// Parse a configured pattern string.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessError`] describing why the entry cannot be used.
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccessError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(AccessError::Whitespace(raw.to_string()));
        }
        if trimmed.matches('*').count() > 1 {
            return Err(AccessError::MultipleWildcards(raw.to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();

        let (scheme, authority) = match lowered.split_once(SCHEME_SEPARATOR) {
            Some((scheme, authority)) => {
                let valid_scheme = !scheme.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
                if !valid_scheme {
                    return Err(AccessError::InvalidScheme(raw.to_string()));
                }
                (Some(scheme.to_string()), authority)
            }
            None => (None, lowered.as_str()),
        };

        // One trailing slash is tolerated on the authority only
        let host = authority.strip_suffix('/').unwrap_or(authority).to_string();

        if host.is_empty() {
            return Err(AccessError::MissingHost(raw.to_string()));
        }
        if host.contains(['/', '?', '#']) {
            return Err(AccessError::UnexpectedPath(raw.to_string()));
        }

        let normalized = match &scheme {
            Some(scheme) => format!("{}{}{}", scheme, SCHEME_SEPARATOR, host),
            None => host.clone(),
        };

        Ok(Self {
            pattern: normalized,
            scheme,
            host,
        })
    }

    /// The normalized pattern (`scheme://host` or `host`).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Scheme of the entry, if it has one.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Host portion of the entry (may contain a port and a wildcard).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the entry contains a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }

    /// Match a normalized origin (`scheme://authority`).
    ///
    /// Scheme-carrying entries compare against the whole origin; host-only
    /// entries compare against the origin's authority.
    pub fn matches_origin(&self, origin: &str) -> bool {
        match self.scheme {
            Some(_) => wildcard_match(&self.pattern, origin),
            None => {
                let authority = origin
                    .split_once(SCHEME_SEPARATOR)
                    .map(|(_, authority)| authority)
                    .unwrap_or(origin);
                wildcard_match(&self.host, authority)
            }
        }
    }

    /// Match a normalized `Host` header value against the host portion only.
    ///
    /// A port on the Host value is ignored when the entry names no port.
    pub fn matches_host(&self, host: &str) -> bool {
        if wildcard_match(&self.host, host) {
            return true;
        }
        match strip_port(host) {
            Some(bare) if !has_port(&self.host) => wildcard_match(&self.host, bare),
            _ => false,
        }
    }

    /// The entry as a concrete origin usable in `Access-Control-Allow-Origin`.
    ///
    /// Only entries with a scheme and without a wildcard qualify.
    pub fn fixed_origin(&self) -> Option<&str> {
        if self.scheme.is_some() && !self.is_wildcard() {
            Some(&self.pattern)
        } else {
            None
        }
    }
}

/// `host` without a trailing `:<digits>` port, if it has one.
fn strip_port(host: &str) -> Option<&str> {
    let (bare, port) = host.rsplit_once(':')?;
    if !bare.is_empty() && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        Some(bare)
    } else {
        None
    }
}

fn has_port(host: &str) -> bool {
    strip_port(host).is_some() || host.ends_with(":*")
}

/// A configured entry that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub entry: String,
    pub reason: String,
}

/// The parsed allow-list.
///
/// Built once from configuration; unparseable entries are logged and kept
/// aside so the decision trace can report them.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: Vec<AllowListEntry>,
    skipped: Vec<SkippedEntry>,
}

impl AllowList {
    /// Parse every configured pattern, skipping the invalid ones.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut entries = Vec::with_capacity(patterns.len());
        let mut skipped = Vec::new();

        for raw in patterns {
            let raw = raw.as_ref();
            match AllowListEntry::parse(raw) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        entry = %raw,
                        error = %e,
                        "Skipping unparseable allow-list entry"
                    );
                    skipped.push(SkippedEntry {
                        entry: raw.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Self { entries, skipped }
    }

    /// Parsed entries, in configuration order.
    pub fn entries(&self) -> &[AllowListEntry] {
        &self.entries
    }

    /// Entries that were rejected at parse time.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry that can be sent verbatim as a CORS origin.
    pub fn fixed_cors_origin(&self) -> Option<&str> {
        self.entries.iter().find_map(AllowListEntry::fixed_origin)
    }
}
