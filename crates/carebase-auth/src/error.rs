//! Authentication and authorization error types.
//!
//! This module defines the errors raised by registration, login, the bearer
//! gate and the hospital scope guard. HTTP mapping lives in
//! [`crate::middleware::error`].

use std::fmt;

use carebase_core::StorageError;

use crate::password::PasswordError;
use crate::token::TokenError;

/// Errors that can occur during authentication and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is malformed or missing required fields.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// The request lacks valid authentication credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// Username/password pair did not match a staff member.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The authenticated staff member may not access the requested hospital.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The referenced hospital does not exist.
    #[error("Hospital not found: {reference}")]
    HospitalNotFound {
        /// The id or name that failed to resolve.
        reference: String,
    },

    /// The username is already registered in the hospital.
    #[error("Username already taken: {username}")]
    UsernameTaken {
        /// The conflicting username.
        username: String,
    },

    /// Password hashing or hash parsing failed.
    #[error("Hashing failure: {message}")]
    HashingFailure {
        /// Description of the failure.
        message: String,
    },

    /// Token issuance failed.
    #[error("Token error: {message}")]
    Token {
        /// Description of the failure.
        message: String,
    },

    /// Storage operation failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `HospitalNotFound` error.
    #[must_use]
    pub fn hospital_not_found(reference: impl Into<String>) -> Self {
        Self::HospitalNotFound {
            reference: reference.into(),
        }
    }

    /// Creates a new `UsernameTaken` error.
    #[must_use]
    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    /// Creates a new `HashingFailure` error.
    #[must_use]
    pub fn hashing_failure(message: impl Into<String>) -> Self {
        Self::HashingFailure {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
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

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::InvalidCredentials => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::HospitalNotFound { .. } => ErrorCategory::NotFound,
            Self::UsernameTaken { .. } => ErrorCategory::Conflict,
            Self::HashingFailure { .. } => ErrorCategory::Internal,
            Self::Token { .. } => ErrorCategory::Internal,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Machine readable code placed in error response bodies.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Forbidden { .. } => "forbidden",
            Self::HospitalNotFound { .. } => "hospital_not_found",
            Self::UsernameTaken { .. } => "username_taken",
            Self::HashingFailure { .. }
            | Self::Token { .. }
            | Self::Storage { .. }
            | Self::Internal { .. } => "internal_error",
        }
    }

    /// Returns `true` for failures caused by the server rather than the caller.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Internal | ErrorCategory::Infrastructure
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        Self::hashing_failure(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Token {
            message: err.to_string(),
        }
    }
}

/// Categories of authentication errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Identity verification failed.
    Authentication,
    /// Permission checks failed.
    Authorization,
    /// Request validation errors.
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// A uniqueness rule would be violated.
    Conflict,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Infrastructure => "infrastructure",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::hospital_not_found("Central");
        assert_eq!(err.to_string(), "Hospital not found: Central");

        let err = AuthError::username_taken("alice");
        assert_eq!(err.to_string(), "Username already taken: alice");

        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            AuthError::unauthorized("x").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::forbidden("x").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            AuthError::username_taken("x").category(),
            ErrorCategory::Conflict
        );
        assert!(AuthError::storage("x").is_internal());
        assert!(AuthError::hashing_failure("x").is_internal());
        assert!(!AuthError::InvalidCredentials.is_internal());
    }

    #[test]
    fn test_from_storage_error() {
        let err: AuthError = StorageError::connection_error("refused").into();
        assert!(matches!(err, AuthError::Storage { .. }));
        assert_eq!(err.error_code(), "internal_error");
    }
}
