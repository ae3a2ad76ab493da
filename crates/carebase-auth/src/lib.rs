//! Staff authentication and tenant scoping for CareBase.
//!
//! This crate provides:
//!
//! - Argon2id credential hashing ([`password`])
//! - HS256 bearer token issuance and verification ([`token::jwt`])
//! - Tolerant identity extraction from token payloads ([`token::claims`])
//! - Staff registration and login ([`service`])
//! - Axum extractors for the bearer gate and the hospital scope guard
//!   ([`middleware`])
//!
//! Persistence is abstracted behind the traits in [`storage`]; the PostgreSQL
//! and in-memory backends live in their own crates.

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod service;
pub mod storage;
pub mod token;

pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthState, BearerAuth, HospitalScope, StaffContext};
pub use service::{AuthService, LoginOutcome};
pub use storage::{HospitalStorage, StaffStorage};
pub use token::{Identity, TokenCodec, TokenError};

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
