//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `herald_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `requester` — strategy name (e.g. "getCached", "getUntil")
//! - `status` — outcome: "ok" or "error"

/// Total transport calls issued by the orchestrator.
///
/// Labels: `requester`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "herald_requests_total";

/// Transport call duration in seconds.
///
/// Labels: `requester`.
pub const REQUEST_DURATION_SECONDS: &str = "herald_request_duration_seconds";

/// Cached strategy calls answered by an existing entry.
///
/// Labels: `requester`.
pub const CACHE_HITS_TOTAL: &str = "herald_cache_hits_total";

/// Cached strategy calls that created a new entry.
///
/// Labels: `requester`.
pub const CACHE_MISSES_TOTAL: &str = "herald_cache_misses_total";

/// Debounced calls folded into an already-open debounce cycle.
pub const DEBOUNCE_ABSORBED_TOTAL: &str = "herald_debounce_absorbed_total";
