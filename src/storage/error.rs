//! Storage-specific error types.
//!
//! The operation surface deliberately exposes only two error kinds,
//! [`StorageError::InvalidArgument`] and [`StorageError::NotFound`], which map
//! 1:1 onto the RPC wire status. [`StorageError::Connection`] is produced only
//! by the adapter constructors during startup.

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// Adapters never let a backend error escape unwrapped: every failure is
/// re-signaled as one of these variants with the operation, the record id
/// where applicable, and the stringified cause in the message.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Malformed identifier, rejected write, or a mutation that matched
    /// zero rows/documents.
    #[error("{0}")]
    InvalidArgument(String),

    /// Read or list against a record that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Failed to establish the backend connection at startup.
    #[error("connection error: {0}")]
    Connection(String),
}

impl StorageError {
    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = StorageError::invalid_argument("invalid blog id");
        assert!(matches!(err, StorageError::InvalidArgument(ref m) if m == "invalid blog id"));

        let err = StorageError::not_found("no documents were found for id: abc");
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = StorageError::connection("refused");
        assert_eq!(err.to_string(), "connection error: refused");
    }

    #[test]
    fn test_operation_errors_display_bare_message() {
        // The RPC layer prints these as the Twirp `msg` field; the status
        // code already carries the kind.
        let err = StorageError::invalid_argument("unable to delete blog with id: 42");
        assert_eq!(err.to_string(), "unable to delete blog with id: 42");
    }
}
