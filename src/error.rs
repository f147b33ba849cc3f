//! Herald error types

/// Herald error types.
///
/// Errors are `Clone` because a single outcome is replayed to every
/// subscriber of a shared source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeraldError {
    // Transport errors
    /// The server answered with a non-success status. `message` is the
    /// fully formatted `"<status>[ <status text>] - <detail>"` string.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Any other transport failure (connection, decoding, ...).
    #[error("{0}")]
    Transport(String),

    // Cache errors
    #[error("cache error: {0}")]
    Cache(String),

    /// A pending source was finalized before it produced a value,
    /// e.g. because its cache entry was evicted.
    #[error("source closed before a response was delivered")]
    Closed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HeraldError {
    /// HTTP status of a structured transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HeraldError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HeraldError {
    fn from(err: serde_json::Error) -> Self {
        HeraldError::Json(err.to_string())
    }
}

/// Result type alias for Herald operations
pub type Result<T> = std::result::Result<T, HeraldError>;
