//! Access guard configuration.

use serde::{Deserialize, Serialize};

use crate::access::AllowList;

/// Allow-list of origins permitted to load images.
///
/// ```yaml
/// access:
///   allowed_origins:
///     - "https://gallery.example.com"
///     - "https://*.vercel.app"
///     - "http://localhost:3000"
///   debug: false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Origin patterns, `scheme://host[:port]` or host-only, one `*` allowed
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Honor `debug=true` on the query string and return the decision trace.
    /// Keep off for production traffic.
    #[serde(default)]
    pub debug: bool,
}

impl AccessConfig {
    /// Parse the configured patterns. Invalid entries are skipped and logged.
    pub fn allow_list(&self) -> AllowList {
        AllowList::from_patterns(&self.allowed_origins)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.allow_list().is_empty() {
            return Err(
                "access.allowed_origins must contain at least one valid entry".to_string(),
            );
        }
        Ok(())
    }
}
