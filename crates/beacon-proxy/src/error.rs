//! Error types for proxy rule resolution.

use thiserror::Error;

/// Proxy resolution error type.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] beacon_storage::StorageError),

    /// Host proxy lookup error.
    #[error("Lookup error: {0}")]
    Lookup(String),
}

/// Result type for proxy resolution operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
