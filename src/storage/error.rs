//! Storage error types

use crate::core::InvalidCoordinate;

/// Errors raised by key-value namespaces and the coordinate store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Namespace could not be read
    #[error("failed to read namespace '{namespace}': {source}")]
    Read {
        namespace: String,
        #[source]
        source: std::io::Error,
    },
    /// Commit could not be written
    #[error("failed to commit namespace '{namespace}': {source}")]
    Write {
        namespace: String,
        #[source]
        source: std::io::Error,
    },
    /// Namespace content is not a valid key-value document
    #[error("namespace '{namespace}' is corrupted: {source}")]
    Corrupted {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
    /// Stored coordinates do not form a valid position
    #[error("stored coordinates are invalid: {0}")]
    InvalidPosition(#[from] InvalidCoordinate),
}

impl StoreError {
    /// Whether the error arose while persisting data
    pub fn is_write_failure(&self) -> bool {
        matches!(self, StoreError::Write { .. })
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
