//! Debounced GET.
//!
//! The orchestrator holds at most one debounce cycle. A cycle opens on the
//! first call, waits until `window` has passed without another call, issues
//! one request for the most recent URL and closes once that request
//! completes. Every call made during the cycle attaches to its broadcaster.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::{Inner, Orchestrator, deadline_after, lock};
use crate::broadcast::Broadcaster;
use crate::source::Source;
use crate::telemetry;
use crate::types::{Envelope, Requester};

pub(crate) struct DebounceCycle {
    phase: Phase,
    broadcaster: Broadcaster<Arc<Envelope>>,
}

enum Phase {
    /// Quiet period running; the request fires at `deadline`.
    Waiting { deadline: Instant, url: String },
    /// Request issued; later calls still attach until it completes.
    InFlight,
}

impl Orchestrator {
    /// GET after a quiet period.
    ///
    /// Calls arriving within `window` of each other (default: the
    /// configured debounce) collapse into one request for the latest URL,
    /// and every caller receives the same envelope. Calls made while that
    /// request is in flight attach to it as well. A `window` too large to
    /// schedule fails with `InvalidInput` and leaves any open cycle alone.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context when a new cycle opens.
    pub fn get_debounced(&self, url: &str, window: Option<Duration>) -> Source<Arc<Envelope>> {
        let window = window.unwrap_or_else(|| self.inner.config.debounce_duration());
        let deadline = match deadline_after(window) {
            Ok(deadline) => deadline,
            Err(err) => return Source::failed(err),
        };

        let mut cycle = lock(&self.inner.debounce);
        if let Some(open) = cycle.as_mut() {
            metrics::counter!(telemetry::DEBOUNCE_ABSORBED_TOTAL).increment(1);
            if let Phase::Waiting { deadline: d, url: u } = &mut open.phase {
                *d = deadline;
                url.clone_into(u);
                debug!(url, "debounce window re-armed");
            }
            return open.broadcaster.source();
        }

        let broadcaster = Broadcaster::new();
        *cycle = Some(DebounceCycle {
            phase: Phase::Waiting {
                deadline,
                url: url.to_owned(),
            },
            broadcaster: broadcaster.clone(),
        });
        debug!(url, ?window, "debounce cycle opened");
        tokio::spawn(run_cycle(Arc::clone(&self.inner)));
        broadcaster.source()
    }
}

async fn run_cycle(inner: Arc<Inner>) {
    let (url, broadcaster) = loop {
        let deadline = match lock(&inner.debounce).as_ref().map(|c| &c.phase) {
            Some(Phase::Waiting { deadline, .. }) => *deadline,
            _ => return,
        };
        tokio::time::sleep_until(deadline).await;

        let mut guard = lock(&inner.debounce);
        let Some(cycle) = guard.as_mut() else {
            return;
        };
        let due = matches!(&cycle.phase, Phase::Waiting { deadline, .. } if *deadline <= Instant::now());
        if !due {
            continue;
        }
        if let Phase::Waiting { url, .. } = std::mem::replace(&mut cycle.phase, Phase::InFlight) {
            break (url, cycle.broadcaster.clone());
        }
    };

    let outcome = inner
        .fetch(Requester::GetDebounced, &url)
        .await
        .map(Arc::new);

    *lock(&inner.debounce) = None;
    match outcome {
        Ok(envelope) => broadcaster.resolve(envelope),
        Err(err) => broadcaster.reject(err),
    };
}
