//! Error types for the sync engines.

use tablesync_core::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Transport errors are scoped to the one request that failed and never
/// abort a whole cycle. Store errors are fatal for the cycle: local
/// consistency cannot be assumed after one. "Not found" is not a
/// generic failure but the conflict signal driving the state-machine
/// reconciliation.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or timeout failure for a single request.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the caller may retry the request.
        retryable: bool,
    },

    /// The server reports the targeted resource does not exist.
    #[error("resource {uuid} does not exist on the server")]
    NotFound {
        /// Identity of the missing object.
        uuid: Uuid,
    },

    /// Local persistence failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a not-found conflict for the given object.
    pub fn not_found(uuid: Uuid) -> Self {
        Self::NotFound { uuid }
    }

    /// Returns true if the caller may retry the failed request.
    ///
    /// Retrying is the caller's policy; the engines never retry
    /// internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport { retryable: true, .. })
    }

    /// Returns true for errors that abort the whole cycle instead of
    /// being isolated to one table or object.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Store(_))
    }

    /// Returns true for the not-found conflict signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality_classification() {
        assert!(!SyncError::transport("connection reset").is_fatal());
        assert!(!SyncError::not_found(Uuid::nil()).is_fatal());
        assert!(SyncError::Store(StoreError::PropertyNotFound(1)).is_fatal());
    }

    #[test]
    fn retryability_classification() {
        assert!(SyncError::transport("timeout").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(!SyncError::not_found(Uuid::nil()).is_retryable());
    }
}
