//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Transport, TransportError};
use crate::{HeraldError, Result};

/// Default request timeout applied by [`ReqwestTransport::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] over a shared [`reqwest::Client`].
///
/// Success responses are parsed as JSON (an empty body becomes `null`).
/// Non-success responses become [`TransportError::Status`] carrying the
/// canonical reason phrase and the body, parsed as JSON when possible.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<Value, TransportError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(TransportError::status(
                status.as_u16(),
                status.canonical_reason(),
                body,
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
