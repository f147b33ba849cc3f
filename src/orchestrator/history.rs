//! Per-requester request numbering

use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::types::Requester;

/// Last issued request number per requester.
#[derive(Debug, Default)]
pub(crate) struct RequestHistory {
    counters: Mutex<HashMap<Requester, u64>>,
}

impl RequestHistory {
    /// Issue the next number for `requester` (the first is 1).
    pub(crate) fn next(&self, requester: Requester) -> u64 {
        let mut counters = lock(&self.counters);
        let counter = counters.entry(requester).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Last issued number for `requester` (0 if none).
    pub(crate) fn current(&self, requester: Requester) -> u64 {
        lock(&self.counters)
            .get(&requester)
            .copied()
            .unwrap_or(0)
    }
}
