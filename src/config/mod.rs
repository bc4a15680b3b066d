// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub mod access;
pub mod server;
pub mod upstream;

pub use access::AccessConfig;
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

use crate::watermark::WatermarkConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub access: AccessConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(skip)]
    pub generation: u64, // Config version, increments on reload
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // Every referenced variable must be set
        let mut values = HashMap::new();
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            let value = std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
            values.insert(var_name.to_string(), value);
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });

        let mut config: Config = serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;
        config.generation = 0;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.upstream.validate()?;
        self.access.validate()?;
        self.watermark.validate()?;
        Ok(())
    }
}
