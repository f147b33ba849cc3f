//! Builder for configuring orchestrator instances

use std::sync::Arc;
use std::time::Duration;

use super::Orchestrator;
use crate::cache::{CacheEntry, CacheStore, MemoryStore};
use crate::config::HeraldConfig;
use crate::transport::{ReqwestTransport, Transport};
use crate::{HeraldError, Result};

/// Main entry point for creating orchestrator instances.
pub struct Herald;

impl Herald {
    /// Create a new builder for configuring the orchestrator.
    pub fn builder() -> HeraldBuilder {
        HeraldBuilder::new()
    }
}

/// Builder for configuring orchestrator instances.
pub struct HeraldBuilder {
    config: HeraldConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheStore<CacheEntry>>>,
}

impl HeraldBuilder {
    pub fn new() -> Self {
        Self {
            config: HeraldConfig::default(),
            transport: None,
            cache: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: HeraldConfig) -> Self {
        self.config = config;
        self
    }

    /// Time-to-live of cached responses (default: 60s).
    ///
    /// The default store caps this at [`MAX_TTL`](crate::cache::MAX_TTL).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config = self.config.cache_ttl(ttl);
        self
    }

    /// Default debounce window (default: 1s).
    pub fn debounce(mut self, window: Duration) -> Self {
        self.config = self.config.debounce(window);
        self
    }

    /// Default polling interval (default: 1s).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.poll_interval(interval);
        self
    }

    /// Use a custom transport instead of the reqwest-backed default.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom cache store instead of the in-memory default.
    ///
    /// The store's own TTL applies; `cache_ttl` only configures the default
    /// store.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore<CacheEntry>>) -> Self {
        self.cache = Some(store);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        if self.config.poll_interval == 0 {
            return Err(HeraldError::Configuration(
                "poll_interval must be greater than zero".into(),
            ));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(
                self.config.request_timeout_duration(),
            )?),
        };

        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(MemoryStore::with_max_entries(
                self.config.cache_ttl_duration(),
                self.config.cache_max_entries,
            ))
        });

        Ok(Orchestrator::new(transport, cache, self.config))
    }
}

impl Default for HeraldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
