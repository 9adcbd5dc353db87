//! Storage error types.

use thiserror::Error;

/// Errors that can occur when using a session store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be represented by this backend.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Backend state is unusable (e.g. a poisoned lock).
    #[error("Store operation failed: {0}")]
    StoreError(String),
}
