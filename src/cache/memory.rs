//! In-memory cache store backed by moka.

use std::time::Duration;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;

use super::{CacheKey, CacheStore, EvictionCallback};
use crate::Result;

/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Longest time-to-live moka accepts (1000 years). Longer TTLs are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(1_000 * 365 * 24 * 3600);

#[derive(Clone)]
struct Stored<V> {
    value: V,
    on_evict: Option<EvictionCallback>,
}

/// Thread-safe LRU + TTL store.
///
/// Entries expire `ttl` after insertion. Eviction callbacks run when moka
/// drops the entry: immediately for `remove`/`clear`, and during
/// housekeeping (or an explicit [`sweep`](CacheStore::sweep)) for expiry.
///
/// ```rust
/// # use herald::cache::{CacheStore, MemoryStore};
/// # use std::time::Duration;
/// let store: MemoryStore<&str> = MemoryStore::new(Duration::from_secs(60));
/// assert!(store.add(1, "a", None).unwrap());
/// assert!(!store.add(1, "b", None).unwrap());
/// assert_eq!(store.find(1).unwrap(), Some("a"));
/// ```
pub struct MemoryStore<V> {
    cache: Cache<CacheKey, Stored<V>>,
    ttl: Duration,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a store with the default capacity.
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Create a store with a custom capacity.
    ///
    /// A `ttl` above [`MAX_TTL`] is clamped to it.
    pub fn with_max_entries(ttl: Duration, max_entries: u64) -> Self {
        let ttl = ttl.min(MAX_TTL);
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .eviction_listener(|key, stored: Stored<V>, cause: RemovalCause| {
                debug!(key = *key, ?cause, "cache entry evicted");
                if let Some(on_evict) = stored.on_evict {
                    on_evict();
                }
            })
            .build();
        Self { cache, ttl }
    }
}

impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn add(&self, key: CacheKey, value: V, on_evict: Option<EvictionCallback>) -> Result<bool> {
        let entry = self
            .cache
            .entry(key)
            .or_insert_with(|| Stored { value, on_evict });
        Ok(entry.is_fresh())
    }

    fn remove(&self, key: CacheKey) -> Result<usize> {
        Ok(usize::from(self.cache.remove(&key).is_some()))
    }

    fn find(&self, key: CacheKey) -> Result<Option<V>> {
        Ok(self.cache.get(&key).map(|stored| stored.value))
    }

    fn contains(&self, key: CacheKey) -> bool {
        self.cache.contains_key(&key)
    }

    fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sweep(&self) {
        self.cache.run_pending_tasks();
    }
}
