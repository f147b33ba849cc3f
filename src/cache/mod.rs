//! Response cache.
//!
//! The cached strategies store [`CacheEntry`] values, not responses: each
//! entry is a [`Broadcaster`] that is pending while the request is in
//! flight and replays the envelope once it lands. Concurrent callers for
//! the same key therefore share one request.
//!
//! Any store can back the orchestrator by implementing [`CacheStore`].
//! Expiry is the store's business; the orchestrator only asks whether a key
//! is present. [`MemoryStore`] is the default, an in-memory LRU + TTL store
//! built on moka.

mod memory;

pub use memory::{DEFAULT_MAX_ENTRIES, MAX_TTL, MemoryStore};

use std::sync::Arc;

use crate::Result;
use crate::broadcast::Broadcaster;
use crate::hash::hash_code;
use crate::immutable::FrozenEnvelope;
use crate::types::Envelope;

/// Cache key: digest of a (possibly namespaced) URL.
pub type CacheKey = i32;

const IMMUTABLE_NAMESPACE: &str = "immutable";

/// Key under which `get_cached` stores a URL.
pub fn plain_key(url: &str) -> CacheKey {
    hash_code(url)
}

/// Key under which `get_cached_immutable` stores a URL.
pub fn immutable_key(url: &str) -> CacheKey {
    hash_code(&format!("{IMMUTABLE_NAMESPACE}{url}"))
}

/// Callback run once when a store drops an entry (expiry, removal,
/// replacement or clear).
pub type EvictionCallback = Arc<dyn Fn() + Send + Sync>;

/// Key-value store with an externally configured time-to-live.
pub trait CacheStore<V>: Send + Sync {
    /// Insert `value` unless a live entry exists for `key`.
    ///
    /// Returns `true` if the value was inserted. `on_evict` runs when the
    /// inserted entry later leaves the store.
    fn add(&self, key: CacheKey, value: V, on_evict: Option<EvictionCallback>) -> Result<bool>;

    /// Remove an entry, returning how many were removed.
    fn remove(&self, key: CacheKey) -> Result<usize>;

    /// Look up a live entry.
    fn find(&self, key: CacheKey) -> Result<Option<V>>;

    /// Whether a live entry exists.
    fn contains(&self, key: CacheKey) -> bool;

    /// Drop every entry.
    fn clear(&self);

    /// Time-to-live applied to entries.
    fn ttl(&self) -> std::time::Duration;

    /// Process pending expirations and their eviction callbacks.
    ///
    /// Stores that evict eagerly need not override this.
    fn sweep(&self) {}
}

/// Value stored by the cached strategies.
#[derive(Clone)]
pub enum CacheEntry {
    /// Entry of the plain cache (`get_cached`).
    Shared(Broadcaster<Arc<Envelope>>),
    /// Entry of the immutable cache (`get_cached_immutable`).
    Frozen(Broadcaster<FrozenEnvelope>),
}

impl CacheEntry {
    /// Finalize the underlying broadcaster (see [`Broadcaster::close`]).
    pub fn close(&self) -> bool {
        match self {
            CacheEntry::Shared(b) => b.close(),
            CacheEntry::Frozen(b) => b.close(),
        }
    }

    /// Whether the request behind this entry is still in flight.
    pub fn is_pending(&self) -> bool {
        match self {
            CacheEntry::Shared(b) => b.is_pending(),
            CacheEntry::Frozen(b) => b.is_pending(),
        }
    }
}
