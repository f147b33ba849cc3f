//! Frozen envelope snapshots.
//!
//! The immutable strategies serialize an envelope once into a shared,
//! read-only JSON tree and hand each subscriber its own deserialized copy.
//! Whatever one subscriber does to its envelope is invisible to the others.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::types::Envelope;

/// Read-only JSON snapshot of an [`Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenEnvelope(Arc<Value>);

impl FrozenEnvelope {
    /// Snapshot an envelope.
    pub fn freeze(envelope: &Envelope) -> Result<Self> {
        Ok(Self(Arc::new(serde_json::to_value(envelope)?)))
    }

    /// Materialize an independent, mutable copy.
    pub fn thaw(&self) -> Result<Envelope> {
        Ok(Envelope::deserialize(self.0.as_ref())?)
    }

    /// The snapshot itself.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
