//! Server configuration types.
//!
//! This module defines the server-level configuration including:
//! - Address and port bindings
//! - Worker thread count
//! - Path of the image endpoint
//! - `Cache-Control` max-age for successful image responses
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ADDRESS, DEFAULT_CACHE_MAX_AGE_SECS, DEFAULT_IMAGE_PATH, DEFAULT_PORT,
    DEFAULT_THREADS,
};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Default worker thread count
fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_image_path() -> String {
    DEFAULT_IMAGE_PATH.to_string()
}

fn default_cache_max_age() -> u64 {
    DEFAULT_CACHE_MAX_AGE_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Path the image endpoint is served on (default: /api/image)
    #[serde(default = "default_image_path")]
    pub image_path: String,
    /// max-age of the public cache directive on image responses (default: 86400)
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
            image_path: default_image_path(),
            cache_max_age_seconds: default_cache_max_age(),
        }
    }
}

impl ServerConfig {
    /// Listen address in `host:port` form.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Value of the `Cache-Control` header for image responses.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_seconds)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("Server address cannot be empty".to_string());
        }
        if self.threads == 0 {
            return Err("Server threads must be at least 1".to_string());
        }
        if !self.image_path.starts_with('/') {
            return Err(format!(
                "Server image_path '{}' must start with /",
                self.image_path
            ));
        }
        Ok(())
    }
}
