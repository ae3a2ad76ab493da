//! Storage error types shared by repository traits.
//!
//! Every persistence backend (PostgreSQL, in-memory) reports failures through
//! [`StorageError`] so that services can tell a uniqueness conflict apart from
//! an infrastructure failure without knowing which backend is in use.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of record (e.g. "hospital").
        entity: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// A uniqueness constraint would be violated.
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// The kind of record (e.g. "staff").
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// The record data is invalid.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("hospital", "Central");
        assert_eq!(err.to_string(), "hospital not found: Central");

        let err = StorageError::already_exists("staff", "alice@1");
        assert_eq!(err.to_string(), "staff already exists: alice@1");

        let err = StorageError::connection_error("refused");
        assert!(err.to_string().contains("Connection error"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(StorageError::not_found("patient", "NAT001").is_not_found());
        assert!(!StorageError::not_found("patient", "NAT001").is_already_exists());
        assert!(StorageError::already_exists("staff", "alice").is_already_exists());
        assert!(!StorageError::internal("boom").is_not_found());
    }
}
