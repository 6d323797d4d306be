/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing medium is not reachable (no browser window, quota disabled, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Key cannot be mapped onto the backing medium
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend rejected a read or write
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
