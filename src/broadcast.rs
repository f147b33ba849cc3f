//! Single-notification broadcaster.
//!
//! A [`Broadcaster`] settles at most once, with either a value or an error,
//! and replays that outcome to every subscriber: those waiting before it
//! settles and those arriving afterwards. It is the unit stored in the
//! response cache, so every caller of a cached URL attaches to the same
//! pending or completed request.
//!
//! Built on [`tokio::sync::watch`]: the channel keeps the latest value,
//! which is exactly the "buffer the terminal outcome forever" behaviour.

use std::sync::Arc;

use futures_util::stream;
use tokio::sync::watch;

use crate::source::{Source, SourceStream};
use crate::{HeraldError, Result};

/// Broadcasts one terminal outcome to any number of subscribers.
///
/// Cloning is cheap; all clones share the same outcome.
#[derive(Clone)]
pub struct Broadcaster<T> {
    tx: Arc<watch::Sender<Option<Result<T>>>>,
}

impl<T> Broadcaster<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a pending broadcaster.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Settle with a value. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with an error. Returns `false` if already settled.
    pub fn reject(&self, err: HeraldError) -> bool {
        self.settle(Err(err))
    }

    /// Finalize the broadcaster.
    ///
    /// A pending broadcaster is rejected with [`HeraldError::Closed`] so its
    /// subscribers are released; a settled one keeps its outcome.
    pub fn close(&self) -> bool {
        self.settle(Err(HeraldError::Closed))
    }

    fn settle(&self, outcome: Result<T>) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }

    /// Whether no outcome has been recorded yet.
    pub fn is_pending(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// The recorded outcome, if settled.
    pub fn outcome(&self) -> Option<Result<T>> {
        self.tx.borrow().clone()
    }

    /// Wait for the outcome.
    pub async fn wait(&self) -> Result<T> {
        let mut rx = self.tx.subscribe();
        wait_on(&mut rx).await
    }

    /// A stream that yields the outcome once and then ends.
    pub fn subscribe(&self) -> SourceStream<T> {
        let mut rx = self.tx.subscribe();
        Box::pin(stream::once(async move { wait_on(&mut rx).await }))
    }

    /// Expose the broadcaster as a [`Source`].
    pub fn source(&self) -> Source<T> {
        let this = self.clone();
        Source::new(move || this.subscribe())
    }
}

impl<T> Default for Broadcaster<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_on<T: Clone>(rx: &mut watch::Receiver<Option<Result<T>>>) -> Result<T> {
    match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone().unwrap_or(Err(HeraldError::Closed)),
        // All senders dropped while pending.
        Err(_) => Err(HeraldError::Closed),
    }
}
