//! Per-call options for the timed strategies

use std::time::Duration;

/// Options for [`Orchestrator::get_until`](crate::Orchestrator::get_until).
///
/// ```rust
/// # use herald::PollOptions;
/// # use std::time::Duration;
/// let options = PollOptions::new()
///     .interval(Duration::from_millis(250))
///     .limit(4);
/// assert_eq!(options.limit, Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOptions {
    /// Time between polls. `None` uses the configured default (1s).
    pub interval: Option<Duration>,
    /// Maximum number of polls. `None` polls until cancelled.
    pub limit: Option<u32>,
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn limit(mut self, polls: u32) -> Self {
        self.limit = Some(polls);
        self
    }
}
