//! HTTP transport abstraction.
//!
//! The orchestrator only needs one capability from the network: issue a GET
//! and hand back either a JSON body or a failure. [`Transport`] captures
//! that; [`ReqwestTransport`] is the default implementation.
//!
//! Failures are converted into [`HeraldError`] by [`TransportError::into_error`],
//! which produces the user-facing message format:
//!
//! - with a response: `"<status>[ <status text>] - <detail>"`
//! - without one: the underlying message

mod client;

pub use client::ReqwestTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::HeraldError;

/// Issues GET requests on behalf of the orchestrator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return its JSON body.
    async fn get(&self, url: &str) -> std::result::Result<Value, TransportError>;
}

/// A failed transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server responded with a non-success status.
    Status {
        status: u16,
        status_text: Option<String>,
        /// Response body: parsed JSON, or a JSON string holding raw text.
        body: Value,
    },
    /// No usable response (connection refused, timeout, ...).
    Network(String),
    /// A response arrived but its body could not be read.
    Decode(String),
}

impl TransportError {
    /// Build a status error.
    pub fn status(status: u16, status_text: Option<&str>, body: Value) -> Self {
        TransportError::Status {
            status,
            status_text: status_text.filter(|t| !t.is_empty()).map(str::to_owned),
            body,
        }
    }

    /// Format into the error surfaced on response sources.
    pub fn into_error(self) -> HeraldError {
        match self {
            TransportError::Status {
                status,
                status_text,
                body,
            } => {
                let text = status_text.map(|t| format!(" {t}")).unwrap_or_default();
                HeraldError::Status {
                    status,
                    message: format!("{status}{text} - {}", error_detail(&body)),
                }
            }
            TransportError::Network(message) | TransportError::Decode(message) => {
                HeraldError::Transport(message)
            }
        }
    }
}

impl From<TransportError> for HeraldError {
    fn from(err: TransportError) -> Self {
        err.into_error()
    }
}

/// The body's `error` member when it is set, otherwise the whole body.
fn error_detail(body: &Value) -> String {
    match body.get("error") {
        Some(err) if is_truthy(err) => match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        _ => match body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
