//! Error response handling for authentication middleware.
//!
//! Renders [`AuthError`] as `{"error": {"code", "message", "requestId"}}`.
//! Internal failures are logged and replaced by a generic message.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use carebase_core::ErrorBody;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = error_details(&self);

        if self.is_internal() {
            tracing::error!(error = %self, category = %self.category(), "Request failed");
        }

        let mut response = (status, Json(ErrorBody::new(self.error_code(), message))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Returns (HTTP status, client-facing message).
fn error_details(error: &AuthError) -> (StatusCode, String) {
    match error {
        AuthError::InvalidRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AuthError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message.clone()),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, error.to_string()),
        AuthError::Forbidden { message } => (StatusCode::FORBIDDEN, message.clone()),
        AuthError::HospitalNotFound { .. } => (StatusCode::NOT_FOUND, "Hospital not found".to_string()),
        AuthError::UsernameTaken { .. } => (StatusCode::CONFLICT, error.to_string()),
        AuthError::HashingFailure { .. }
        | AuthError::Token { .. }
        | AuthError::Storage { .. }
        | AuthError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}
