//! Orchestrator configuration.
//!
//! All durations are expressed in milliseconds on the wire so the config
//! can be embedded in an application's own TOML/JSON settings:
//!
//! ```toml
//! cache_ttl = 60000      # also accepted as `cacheTtl`
//! cache_max_entries = 10000
//! debounce = 1000
//! poll_interval = 1000
//! request_timeout = 30000
//! ```
//!
//! With the `cli` feature, [`HeraldConfig::load`] reads such a file from
//! an explicit path or `~/.config/herald/config.toml`.

use std::time::Duration;

use serde::Deserialize;

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use crate::{HeraldError, Result};

/// Configuration for an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeraldConfig {
    /// Time-to-live of cached responses, in ms (default: 60000).
    /// Forwarded verbatim to the cache store.
    #[serde(default = "default_cache_ttl", alias = "cacheTtl")]
    pub cache_ttl: u64,
    /// Maximum number of cached responses (default: 10000).
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
    /// Default debounce window, in ms (default: 1000).
    #[serde(default = "default_debounce")]
    pub debounce: u64,
    /// Default polling interval, in ms (default: 1000).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Timeout applied by the default transport, in ms (default: 30000).
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Envelopes buffered per polling subscriber (default: 64).
    #[serde(default = "default_poll_buffer")]
    pub poll_buffer: usize,
}

fn default_cache_ttl() -> u64 {
    60_000
}

fn default_cache_max_entries() -> u64 {
    10_000
}

fn default_debounce() -> u64 {
    1_000
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_poll_buffer() -> usize {
    64
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
            debounce: default_debounce(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            poll_buffer: default_poll_buffer(),
        }
    }
}

impl HeraldConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache time-to-live.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = duration_millis(ttl);
        self
    }

    /// Set the maximum number of cached responses.
    pub fn cache_max_entries(mut self, n: u64) -> Self {
        self.cache_max_entries = n;
        self
    }

    /// Set the default debounce window.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = duration_millis(window);
        self
    }

    /// Set the default polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = duration_millis(interval);
        self
    }

    /// Set the default transport timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = duration_millis(timeout);
        self
    }

    pub fn cache_ttl_duration(&self) -> Duration {
        Duration::from_millis(self.cache_ttl)
    }

    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce)
    }

    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(feature = "cli")]
impl HeraldConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HeraldError::Configuration(format!("failed to parse config: {e}")))
    }

    /// Load configuration.
    ///
    /// Resolution order:
    /// 1. Explicit path (must exist)
    /// 2. `~/.config/herald/config.toml`
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                return Err(HeraldError::Configuration(format!(
                    "config file not found: {path:?}"
                )));
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        let content = std::fs::read_to_string(&path).map_err(|e| {
            HeraldError::Configuration(format!("failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Default config path: `~/.config/herald/config.toml`.
#[cfg(feature = "cli")]
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("herald").join("config.toml"))
}
