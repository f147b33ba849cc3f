//! Subscribable response sources.
//!
//! Every strategy returns a [`Source`]: a cheap, cloneable handle whose
//! [`subscribe()`](Source::subscribe) yields a fresh stream of outcomes.
//! Whether subscribing starts a new request (cold) or attaches to one
//! shared request (hot) depends on the strategy that built the source.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt, stream};

use crate::{HeraldError, Result};

/// Stream of outcomes produced by one subscription.
pub type SourceStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

type Subscribe<T> = dyn Fn() -> SourceStream<T> + Send + Sync;

/// A subscribable source of responses.
pub struct Source<T> {
    subscribe: Arc<Subscribe<T>>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Arc::clone(&self.subscribe),
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Source<T> {
    /// Build a source from a subscription factory.
    pub fn new<F>(subscribe: F) -> Self
    where
        F: Fn() -> SourceStream<T> + Send + Sync + 'static,
    {
        Self {
            subscribe: Arc::new(subscribe),
        }
    }

    /// A source whose every subscription yields `err` and ends.
    pub fn failed(err: HeraldError) -> Self {
        Self::new(move || {
            let err = err.clone();
            Box::pin(stream::once(async move { Err(err) }))
        })
    }

    /// Attach a new subscriber.
    pub fn subscribe(&self) -> SourceStream<T> {
        (self.subscribe)()
    }

    /// Subscribe and wait for the first outcome.
    ///
    /// Returns [`HeraldError::Closed`] if the source ends without
    /// producing anything.
    pub async fn first(&self) -> Result<T> {
        self.subscribe()
            .next()
            .await
            .unwrap_or(Err(HeraldError::Closed))
    }

    /// Transform every successful item of every subscription.
    pub fn and_then<U, F>(self, f: F) -> Source<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Source::new(move || {
            let f = Arc::clone(&f);
            Box::pin(self.subscribe().map(move |item| item.and_then(|value| f(value))))
        })
    }
}
