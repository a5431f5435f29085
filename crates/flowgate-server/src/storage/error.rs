//! Storage error types.

use flowgate_core::ProviderError;
use thiserror::Error;

/// Errors from [`super::Store`] implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying database or lock failure
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A stored record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A record with this key already exists
    #[error("conflict: {0} already exists")]
    Conflict(String),
}

impl From<StorageError> for ProviderError {
    fn from(err: StorageError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
