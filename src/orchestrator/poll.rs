//! Polling GET.
//!
//! One poller task per source, started by the first subscriber and fanned
//! out to every subscriber over a [`tokio::sync::broadcast`] channel. Each
//! tick supersedes the previous poll: a request still in flight when the
//! next tick fires is aborted and never delivered.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{StreamExt, future};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use super::{Inner, Orchestrator, deadline_after, lock};
use crate::source::{Source, SourceStream};
use crate::types::{Envelope, PollOptions, Requester};
use crate::{HeraldError, Result};

type Outcome = Result<Arc<Envelope>>;
type SenderSlot = Arc<Mutex<Option<broadcast::Sender<Outcome>>>>;

impl Orchestrator {
    /// GET repeatedly until `cancel` completes.
    ///
    /// The first poll happens one interval after the first subscription,
    /// then once per interval (default: the configured poll interval).
    /// Polling stops when `cancel` resolves, after the first failed poll,
    /// once every subscriber has gone, or when `limit` polls have been
    /// issued and the last of them has landed. Each subscriber sees the
    /// envelopes produced while it is subscribed; pass
    /// [`std::future::pending()`] to poll without a cancel signal. An
    /// interval of zero, or one too large to schedule, fails with
    /// `InvalidInput`.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context on the first subscription.
    pub fn get_until<C>(&self, url: &str, cancel: C, options: PollOptions) -> Source<Arc<Envelope>>
    where
        C: Future<Output = ()> + Send + 'static,
    {
        let interval = options
            .interval
            .unwrap_or_else(|| self.inner.config.poll_interval_duration());
        if interval.is_zero() {
            return Source::failed(HeraldError::InvalidInput(
                "poll interval must be greater than zero".into(),
            ));
        }
        if let Err(err) = deadline_after(interval) {
            return Source::failed(err);
        }

        let (tx, _) = broadcast::channel(self.inner.config.poll_buffer.max(1));
        let slot: SenderSlot = Arc::new(Mutex::new(Some(tx.clone())));
        let poller = Poller {
            inner: Arc::clone(&self.inner),
            url: url.to_owned(),
            interval,
            limit: options.limit,
            cancel: Box::pin(cancel),
            tx,
            slot: Arc::clone(&slot),
        };
        let pending = Mutex::new(Some(poller));

        Source::new(move || {
            let Some(rx) = lock(&slot).as_ref().map(broadcast::Sender::subscribe) else {
                debug!("polling already finished");
                return Box::pin(futures_util::stream::empty()) as SourceStream<_>;
            };
            let mut idle = lock(&pending);
            if let Some(poller) = idle.take() {
                match deadline_after(poller.interval) {
                    Ok(first_tick) => {
                        tokio::spawn(poller.run(first_tick));
                    }
                    Err(err) => {
                        *idle = Some(poller);
                        return Box::pin(futures_util::stream::once(future::ready(Err(err))))
                            as SourceStream<_>;
                    }
                }
            }
            drop(idle);
            Box::pin(BroadcastStream::new(rx).filter_map(|item| {
                future::ready(match item {
                    Ok(outcome) => Some(outcome),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "poll subscriber lagged, envelopes dropped");
                        None
                    }
                })
            }))
        })
    }
}

struct Poller {
    inner: Arc<Inner>,
    url: String,
    interval: Duration,
    limit: Option<u32>,
    cancel: Pin<Box<dyn Future<Output = ()> + Send>>,
    tx: broadcast::Sender<Outcome>,
    /// Cleared on exit so late subscribers see an ended stream.
    slot: SenderSlot,
}

impl Poller {
    async fn run(self, first_tick: Instant) {
        let Poller {
            inner,
            url,
            interval,
            limit,
            mut cancel,
            tx,
            slot,
        } = self;

        let mut ticker = tokio::time::interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (results_tx, mut results_rx) = mpsc::unbounded_channel::<(u32, Result<Envelope>)>();
        let mut current: Option<JoinHandle<()>> = None;
        let mut issued: u32 = 0;
        let mut awaiting = false;
        let exhausted = |issued: u32| limit.is_some_and(|max| issued >= max);

        debug!(%url, ?interval, ?limit, "polling started");
        loop {
            if exhausted(issued) && !awaiting {
                debug!(%url, issued, "poll limit reached");
                break;
            }
            tokio::select! {
                biased;
                () = &mut cancel => {
                    debug!(%url, issued, "polling cancelled");
                    break;
                }
                Some((seq, outcome)) = results_rx.recv() => {
                    if seq == issued {
                        awaiting = false;
                    }
                    match outcome {
                        Ok(envelope) => {
                            let _ = tx.send(Ok(Arc::new(envelope)));
                        }
                        Err(err) => {
                            let _ = tx.send(Err(err));
                            break;
                        }
                    }
                }
                _ = ticker.tick(), if !exhausted(issued) => {
                    if tx.receiver_count() == 0 {
                        debug!(%url, "no subscribers left, polling stopped");
                        break;
                    }
                    if let Some(previous) = current.take() {
                        previous.abort();
                    }
                    issued += 1;
                    awaiting = true;
                    let seq = issued;
                    let inner = Arc::clone(&inner);
                    let url = url.clone();
                    let results_tx = results_tx.clone();
                    current = Some(tokio::spawn(async move {
                        let outcome = inner.fetch(Requester::GetUntil, &url).await;
                        let _ = results_tx.send((seq, outcome));
                    }));
                }
            }
        }

        if let Some(in_flight) = current {
            in_flight.abort();
        }
        *lock(&slot) = None;
        drop(tx);
    }
}
