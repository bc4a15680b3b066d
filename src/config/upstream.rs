//! Upstream CDN configuration.
//!
//! Identifies where CMS image assets live: the CDN host plus the project and
//! dataset that form the fixed URL template
//! `https://<cdn_host>/images/<project_id>/<dataset>/<id>`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_CDN_HOST, DEFAULT_DATASET, DEFAULT_UPSTREAM_TIMEOUT_SECS};

fn default_cdn_host() -> String {
    DEFAULT_CDN_HOST.to_string()
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// CDN host name (default: cdn.sanity.io)
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
    /// CMS project identifier
    pub project_id: String,
    /// CMS dataset name (default: production)
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Timeout for the whole upstream fetch in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl UpstreamConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            cdn_host: default_cdn_host(),
            project_id: project_id.into(),
            dataset: default_dataset(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cdn_host.trim().is_empty() {
            return Err("Upstream cdn_host cannot be empty".to_string());
        }
        if self.cdn_host.contains(['/', '?', '#', ' ']) {
            return Err(format!(
                "Upstream cdn_host '{}' must be a bare host name",
                self.cdn_host
            ));
        }
        for (name, value) in [("project_id", &self.project_id), ("dataset", &self.dataset)] {
            if value.trim().is_empty() {
                return Err(format!("Upstream {} cannot be empty", name));
            }
            if !value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            {
                return Err(format!(
                    "Upstream {} '{}' may only contain letters, digits, '-' and '_'",
                    name, value
                ));
            }
        }
        if self.timeout_seconds == 0 {
            return Err("Upstream timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}
