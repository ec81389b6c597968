//! Error types for the record store.

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations.
pub type CoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local record store.
///
/// Store errors are treated as fatal by the sync engines: local
/// consistency cannot be assumed after one, so they propagate to the
/// caller of the whole cycle instead of being swallowed per unit.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The targeted object does not exist in the store.
    #[error("object {0} not found in the local store")]
    ObjectNotFound(Uuid),

    /// The targeted property does not exist in the store.
    #[error("property {0} not found in the local store")]
    PropertyNotFound(i64),

    /// An object with the same uuid already exists.
    #[error("object {0} already exists in the local store")]
    DuplicateObject(Uuid),

    /// A property references an object that is not in the store.
    #[error("property owner {0} not found in the local store")]
    OwnerNotFound(i64),

    /// Filesystem error while handling a blob file.
    #[error("blob i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let uuid = Uuid::nil();
        let err = StoreError::ObjectNotFound(uuid);
        assert!(err.to_string().contains("not found"));

        let err = StoreError::PropertyNotFound(42);
        assert!(err.to_string().contains("42"));
    }
}
