//! API error type for HTTP handlers.
//!
//! Handler failures render as `{"error": {"code", "message", "requestId"}}`.
//! Authentication and scope failures keep the rendering of
//! [`carebase_auth::AuthError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use carebase_auth::AuthError;
use carebase_core::{ErrorBody, StorageError};
use carebase_search::SearchError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(e) => match e.category() {
                carebase_auth::ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
                carebase_auth::ErrorCategory::Authorization => StatusCode::FORBIDDEN,
                carebase_auth::ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                carebase_auth::ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                carebase_auth::ErrorCategory::Conflict => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
            ApiError::Auth(e) => e.error_code(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StorageError::AlreadyExists { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidValue { .. } => ApiError::BadRequest(err.to_string()),
            SearchError::Storage(e) => ApiError::from(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Auth(e) = self {
            return e.into_response();
        }

        let message = match &self {
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "Request failed");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                msg.clone()
            }
            ApiError::Auth(e) => e.to_string(),
        };

        (self.status_code(), Json(ErrorBody::new(self.code(), message))).into_response()
    }
}
