//! HTTP middleware for authentication and authorization.
//!
//! This module provides Axum building blocks for:
//!
//! - Bearer token extraction and validation ([`BearerAuth`], [`require_staff`])
//! - Hospital scoping of path-addressed routes ([`HospitalScope`])
//! - JSON error responses for [`AuthError`](crate::AuthError)
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use carebase_auth::middleware::{AuthState, BearerAuth, HospitalScope};
//!
//! async fn whoami(BearerAuth(staff): BearerAuth) -> String {
//!     format!("{} @ {}", staff.username, staff.hospital_id)
//! }
//!
//! async fn scoped(scope: HospitalScope) -> String {
//!     scope.hospital_id.to_string()
//! }
//!
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .route("/{hospital}/scoped", get(scoped))
//!     .with_state(auth_state);
//! ```

pub mod auth;
pub mod error;
pub mod scope;
pub mod types;

pub use auth::{AuthState, BearerAuth, UNAUTHENTICATED_MESSAGE, authenticate, require_staff};
pub use scope::HospitalScope;
pub use types::StaffContext;
