//! Request orchestration.
//!
//! [`Orchestrator`] wraps a [`Transport`] and a [`CacheStore`] and offers
//! one method per request strategy. Each returns a [`Source`]; how a
//! subscription maps onto network calls is what distinguishes them:
//!
//! | Strategy | Network calls | Item |
//! |---|---|---|
//! | [`get`](Orchestrator::get) | one per subscription | `Envelope` |
//! | [`get_shared`](Orchestrator::get_shared) | one, started by the first subscriber | `Arc<Envelope>` |
//! | [`get_immutable`](Orchestrator::get_immutable) | one, started by the first subscriber | `Envelope` (own copy) |
//! | [`get_cached`](Orchestrator::get_cached) | one per cache key and TTL window | `Arc<Envelope>` |
//! | [`get_cached_immutable`](Orchestrator::get_cached_immutable) | one per cache key and TTL window | `Envelope` (own copy) |
//! | [`get_debounced`](Orchestrator::get_debounced) | one per quiet period | `Arc<Envelope>` |
//! | [`get_until`](Orchestrator::get_until) | one per interval until cancelled | `Arc<Envelope>` |
//!
//! Failures never escape as panics or early returns: a failed request
//! shows up as the single `Err` item of its source, and only successful
//! responses consume a request number.

mod builder;
mod debounce;
mod history;
mod poll;

pub use builder::{Herald, HeraldBuilder};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures_util::{FutureExt, stream};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use self::debounce::DebounceCycle;
use self::history::RequestHistory;
use crate::broadcast::Broadcaster;
use crate::cache::{self, CacheEntry, CacheKey, CacheStore, EvictionCallback};
use crate::config::HeraldConfig;
use crate::immutable::FrozenEnvelope;
use crate::source::Source;
use crate::telemetry;
use crate::transport::Transport;
use crate::types::{Envelope, Requester};
use crate::{HeraldError, Result};

/// Issues requests through the strategies described in the module docs.
///
/// Cloning is cheap and clones share all state: request numbering, the
/// cache and the debounce cycle. Build separate instances for isolation.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore<CacheEntry>>,
    history: RequestHistory,
    /// Serializes the find-then-add sequence of the cached strategies.
    cache_gate: Mutex<()>,
    debounce: Mutex<Option<DebounceCycle>>,
    config: HeraldConfig,
}

impl Orchestrator {
    /// Assemble an orchestrator from its collaborators.
    ///
    /// See [`Herald::builder()`] for the usual way to construct one.
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore<CacheEntry>>,
        config: HeraldConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                cache,
                history: RequestHistory::default(),
                cache_gate: Mutex::new(()),
                debounce: Mutex::new(None),
                config,
            }),
        }
    }

    /// Configuration this orchestrator was built with.
    pub fn config(&self) -> &HeraldConfig {
        &self.inner.config
    }

    /// The cache store backing the cached strategies.
    pub fn cache(&self) -> &dyn CacheStore<CacheEntry> {
        self.inner.cache.as_ref()
    }

    /// Number of successful responses attributed to `requester` so far.
    pub fn request_count(&self, requester: Requester) -> u64 {
        self.inner.history.current(requester)
    }

    /// Plain GET.
    ///
    /// Cold: every subscription performs its own request and gets its own
    /// request number.
    pub fn get(&self, url: &str) -> Source<Envelope> {
        let inner = Arc::clone(&self.inner);
        let url = url.to_owned();
        Source::new(move || {
            let inner = Arc::clone(&inner);
            let url = url.clone();
            Box::pin(stream::once(async move {
                inner.fetch(Requester::Get, &url).await
            }))
        })
    }

    /// GET shared among subscribers.
    ///
    /// The request starts when the first subscriber polls and runs once;
    /// every subscriber, including late ones, receives the same `Arc`.
    pub fn get_shared(&self, url: &str) -> Source<Arc<Envelope>> {
        let inner = Arc::clone(&self.inner);
        let url = url.to_owned();
        let request = async move {
            inner
                .fetch(Requester::GetShared, &url)
                .await
                .map(Arc::new)
        }
        .boxed()
        .shared();
        Source::new(move || Box::pin(stream::once(request.clone())))
    }

    /// GET shared among subscribers, each receiving a private copy.
    ///
    /// Like [`get_shared`](Self::get_shared), but the response is frozen
    /// once and thawed per subscriber, so mutating one subscriber's
    /// envelope cannot affect another's.
    pub fn get_immutable(&self, url: &str) -> Source<Envelope> {
        let inner = Arc::clone(&self.inner);
        let url = url.to_owned();
        let request = async move {
            let envelope = inner.fetch(Requester::GetImmutable, &url).await?;
            FrozenEnvelope::freeze(&envelope)
        }
        .boxed()
        .shared();
        Source::new(move || Box::pin(stream::once(request.clone())))
            .and_then(|frozen: FrozenEnvelope| frozen.thaw())
    }

    /// GET through the response cache.
    ///
    /// On a miss the request is issued immediately and its pending result
    /// is cached under the URL's key; every call until the entry expires
    /// attaches to that same result without touching the network.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context on a cache miss.
    pub fn get_cached(&self, url: &str) -> Source<Arc<Envelope>> {
        let key = cache::plain_key(url);
        match self.inner.cached(
            Requester::GetCached,
            key,
            url,
            |entry| match entry {
                CacheEntry::Shared(b) => Some(b),
                CacheEntry::Frozen(_) => None,
            },
            CacheEntry::Shared,
            |envelope| Ok(Arc::new(envelope)),
        ) {
            Ok(broadcaster) => broadcaster.source(),
            Err(err) => Source::failed(err),
        }
    }

    /// GET through the response cache, each subscriber receiving a private
    /// copy.
    ///
    /// Uses a keyspace separate from [`get_cached`](Self::get_cached), so
    /// the two never share entries for the same URL.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context on a cache miss.
    pub fn get_cached_immutable(&self, url: &str) -> Source<Envelope> {
        let key = cache::immutable_key(url);
        match self.inner.cached(
            Requester::GetCachedImmutable,
            key,
            url,
            |entry| match entry {
                CacheEntry::Frozen(b) => Some(b),
                CacheEntry::Shared(_) => None,
            },
            CacheEntry::Frozen,
            |envelope| FrozenEnvelope::freeze(&envelope),
        ) {
            Ok(broadcaster) => broadcaster
                .source()
                .and_then(|frozen: FrozenEnvelope| frozen.thaw()),
            Err(err) => Source::failed(err),
        }
    }

    /// Remove every cached response.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }
}

impl Inner {
    /// Perform one request and map it into an envelope.
    #[instrument(skip(self), fields(requester = %requester))]
    async fn fetch(&self, requester: Requester, url: &str) -> Result<Envelope> {
        let start = Instant::now();
        let outcome = self.transport.get(url).await;
        record_request(requester, start, outcome.is_ok());

        let body = outcome.map_err(|e| {
            let err = e.into_error();
            warn!(error = %err, "request failed");
            err
        })?;

        let number = self.history.next(requester);
        Ok(Envelope::new(requester, extract_payload(body)).request_number(number))
    }

    /// Return the cached broadcaster for `key`, or create one and start
    /// the request that settles it.
    fn cached<T>(
        self: &Arc<Self>,
        requester: Requester,
        key: CacheKey,
        url: &str,
        unwrap: fn(CacheEntry) -> Option<Broadcaster<T>>,
        wrap: fn(Broadcaster<T>) -> CacheEntry,
        produce: fn(Envelope) -> Result<T>,
    ) -> Result<Broadcaster<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let broadcaster = {
            let _gate = lock(&self.cache_gate);

            if let Some(entry) = self.cache.find(key)? {
                if let Some(existing) = unwrap(entry) {
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL, "requester" => requester.as_str())
                        .increment(1);
                    debug!(%requester, key, "cache hit");
                    return Ok(existing);
                }
                debug!(%requester, key, "cache key held by another namespace, replacing");
                self.cache.remove(key)?;
            }

            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "requester" => requester.as_str())
                .increment(1);
            debug!(%requester, key, "cache miss");

            let broadcaster = Broadcaster::new();
            let entry = wrap(broadcaster.clone());
            let on_evict: EvictionCallback = {
                let entry = entry.clone();
                Arc::new(move || {
                    entry.close();
                })
            };
            if !self.cache.add(key, entry, Some(on_evict))? {
                debug!(%requester, key, "store declined entry, serving uncached");
            }
            broadcaster
        };

        let inner = Arc::clone(self);
        let url = url.to_owned();
        let pending = broadcaster.clone();
        tokio::spawn(async move {
            match inner.fetch(requester, &url).await.and_then(produce) {
                Ok(value) => pending.resolve(value),
                Err(err) => pending.reject(err),
            };
        });

        Ok(broadcaster)
    }
}

/// Unwrap a `{"data": ...}` wrapper; other bodies pass through unchanged.
fn extract_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn record_request(requester: Requester, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "requester" => requester.as_str(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "requester" => requester.as_str(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// The instant `delay` from now, or `InvalidInput` if the clock cannot
/// represent it.
pub(crate) fn deadline_after(delay: std::time::Duration) -> Result<tokio::time::Instant> {
    tokio::time::Instant::now()
        .checked_add(delay)
        .ok_or_else(|| HeraldError::InvalidInput(format!("duration {delay:?} is out of range")))
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
