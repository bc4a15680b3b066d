// Configuration reload module
// SIGHUP marks a reload as requested; the next request swaps the new config in

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::access::AllowList;
use crate::config::Config;

/// A validated configuration together with the parsed allow-list.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub allow_list: AllowList,
}

impl LoadedConfig {
    pub fn new(config: Config) -> Self {
        let allow_list = config.access.allow_list();
        Self { config, allow_list }
    }
}

/// Shared, swappable view of the active configuration.
///
/// Requests take a snapshot with [`ConfigHandle::current`] and keep it for
/// their whole lifetime, so a reload never changes a request mid-flight.
pub struct ConfigHandle {
    inner: ArcSwap<LoadedConfig>,
}

impl ConfigHandle {
    pub fn new(config: Config) -> Self {
        Self {
            inner: ArcSwap::from_pointee(LoadedConfig::new(config)),
        }
    }

    pub fn current(&self) -> Arc<LoadedConfig> {
        self.inner.load_full()
    }

    /// Install a new configuration, bumping its generation past the current one.
    pub fn replace(&self, mut config: Config) -> u64 {
        config.generation = self.inner.load().config.generation + 1;
        let generation = config.generation;
        self.inner.store(Arc::new(LoadedConfig::new(config)));
        generation
    }

    /// Load, validate and install the config at `path`.
    ///
    /// On failure the active configuration is kept.
    pub fn reload(&self, path: &Path) -> Result<u64, String> {
        let new_config = Config::from_file(path)?;
        new_config.validate()?;
        Ok(self.replace(new_config))
    }
}

/// ReloadManager handles configuration reload via SIGHUP signal
pub struct ReloadManager {
    config_path: PathBuf,
    reload_requested: Arc<AtomicBool>,
}

impl ReloadManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            reload_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register SIGHUP signal handler that sets the reload flag
    #[cfg(unix)]
    pub fn register_signal_handler(&self) -> Result<(), String> {
        use signal_hook::consts::SIGHUP;
        use signal_hook::flag;

        flag::register(SIGHUP, Arc::clone(&self.reload_requested))
            .map_err(|e| format!("Failed to register SIGHUP handler: {}", e))?;

        Ok(())
    }

    pub fn is_reload_requested(&self) -> bool {
        self.reload_requested.load(Ordering::Relaxed)
    }

    /// Consume a pending reload request. Returns true at most once per signal.
    pub fn take_reload_request(&self) -> bool {
        self.reload_requested.swap(false, Ordering::AcqRel)
    }

    pub fn reload_into(&self, handle: &ConfigHandle) -> Result<u64, String> {
        handle.reload(&self.config_path)
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}
