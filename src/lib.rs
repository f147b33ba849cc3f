//! Herald - request orchestration for JSON HTTP APIs
//!
//! This crate wraps a plain GET transport in a set of request strategies
//! (shared, cached, debounced, polling and their immutable variants) so
//! callers can say *how* a response should be obtained without managing
//! in-flight requests, caches or timers themselves.
//!
//! Every strategy returns a [`Source`]. Subscribing to it yields the
//! response wrapped in an [`Envelope`] that records which strategy produced
//! it and how many responses that strategy has produced so far.
//!
//! # Example
//!
//! ```rust,no_run
//! use herald::Herald;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> herald::Result<()> {
//!     let herald = Herald::builder()
//!         .cache_ttl(Duration::from_secs(30))
//!         .build()?;
//!
//!     // Both calls share one request while the entry is live.
//!     let users = herald.get_cached("https://api.example.com/users");
//!     let again = herald.get_cached("https://api.example.com/users");
//!
//!     let (a, b) = (users.first().await?, again.first().await?);
//!     assert_eq!(a.request_number, b.request_number);
//!     println!("{}", a.data);
//!     Ok(())
//! }
//! ```
//!
//! # Runtime
//!
//! Sources are plain futures and streams, but the cached, debounced and
//! polling strategies spawn background tasks and must be used from within
//! a tokio runtime.

pub mod broadcast;
pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod immutable;
pub mod orchestrator;
pub mod source;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use broadcast::Broadcaster;
pub use cache::{CacheEntry, CacheStore, MemoryStore};
pub use config::HeraldConfig;
pub use error::{HeraldError, Result};
pub use immutable::FrozenEnvelope;
pub use orchestrator::{Herald, HeraldBuilder, Orchestrator};
pub use source::{Source, SourceStream};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{Envelope, PollOptions, Requester};
