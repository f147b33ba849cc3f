//! Response envelope

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Requester;
use crate::Result;

/// A response payload together with its request provenance.
///
/// Every strategy of the [`Orchestrator`](crate::Orchestrator) delivers
/// envelopes. The payload defaults to raw JSON; use
/// [`decode()`](Envelope::decode) to get a typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    /// Strategy that produced this response.
    pub requester: Requester,
    /// 1-based sequence number, counted per requester.
    pub request_number: u64,
    /// When the envelope was created.
    pub last_request_timestamp: DateTime<Utc>,
    /// Response body.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap `data`, numbering it as the first request and stamping it now.
    pub fn new(requester: Requester, data: T) -> Self {
        Self {
            requester,
            request_number: 1,
            last_request_timestamp: Utc::now(),
            data,
        }
    }

    pub fn request_number(mut self, number: u64) -> Self {
        self.request_number = number;
        self
    }

    pub fn last_request_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.last_request_timestamp = timestamp;
        self
    }

    /// Transform the payload, keeping the provenance fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            requester: self.requester,
            request_number: self.request_number,
            last_request_timestamp: self.last_request_timestamp,
            data: f(self.data),
        }
    }
}

impl Envelope<Value> {
    /// Deserialize the JSON payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Envelope<T>> {
        let data = T::deserialize(&self.data)?;
        Ok(Envelope {
            requester: self.requester,
            request_number: self.request_number,
            last_request_timestamp: self.last_request_timestamp,
            data,
        })
    }
}
