//! Search error types.

use carebase_core::StorageError;

/// Errors that can occur while parsing or running a patient search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A criterion value could not be parsed.
    #[error("Invalid value for '{param}': {message}")]
    InvalidValue {
        /// The query parameter name.
        param: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SearchError {
    /// Creates a new `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            param,
            message: message.into(),
        }
    }
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
