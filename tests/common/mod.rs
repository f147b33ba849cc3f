//! Shared test fixtures: a scripted in-memory transport.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use herald::{Herald, Orchestrator, Transport, TransportError};

type Reply = Result<Value, TransportError>;

/// Transport answering from a URL → reply table, recording every call.
///
/// Unknown URLs answer `404 Not Found - no route`. Calls are recorded
/// before the optional delay, so aborted requests still count.
pub struct MockTransport {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    delay: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Delay every response (uses tokio time, so paused clocks apply).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(&self, url: &str, body: Value) -> &Self {
        self.routes.lock().unwrap().insert(url.to_owned(), Ok(body));
        self
    }

    pub fn fail(&self, url: &str, err: TransportError) -> &Self {
        self.routes.lock().unwrap().insert(url.to_owned(), Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(url.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.routes.lock().unwrap().get(url).cloned();
        reply.unwrap_or_else(|| {
            Err(TransportError::status(
                404,
                Some("Not Found"),
                json!({"error": "no route"}),
            ))
        })
    }
}

/// An orchestrator over `transport` with default settings.
pub fn orchestrator(transport: &Arc<MockTransport>) -> Orchestrator {
    Herald::builder()
        .transport(transport.clone())
        .build()
        .unwrap()
}

pub const USERS: &str = "https://api.example.com/users";
pub const ORDERS: &str = "https://api.example.com/orders";
