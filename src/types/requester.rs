//! Strategy names used to tag envelopes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which strategy produced an [`Envelope`](super::Envelope).
///
/// Request numbers are counted per requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Requester {
    Get,
    GetShared,
    GetDebounced,
    GetUntil,
    GetImmutable,
    GetCached,
    GetCachedImmutable,
}

impl Requester {
    /// All requesters, in declaration order.
    pub const ALL: [Requester; 7] = [
        Requester::Get,
        Requester::GetShared,
        Requester::GetDebounced,
        Requester::GetUntil,
        Requester::GetImmutable,
        Requester::GetCached,
        Requester::GetCachedImmutable,
    ];

    /// The wire name of this requester (e.g. `"getCached"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Requester::Get => "get",
            Requester::GetShared => "getShared",
            Requester::GetDebounced => "getDebounced",
            Requester::GetUntil => "getUntil",
            Requester::GetImmutable => "getImmutable",
            Requester::GetCached => "getCached",
            Requester::GetCachedImmutable => "getCachedImmutable",
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for requester in Requester::ALL {
            let json = serde_json::to_value(requester).unwrap();
            assert_eq!(json, requester.as_str());
            assert_eq!(requester.to_string(), requester.as_str());
        }
        assert_eq!(Requester::GetCachedImmutable.as_str(), "getCachedImmutable");
    }
}
