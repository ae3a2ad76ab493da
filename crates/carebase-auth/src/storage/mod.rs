//! Storage traits for hospitals and staff.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `carebase-db-postgres` - PostgreSQL storage backend
//! - `carebase-db-memory` - in-process backend for development and tests

pub mod hospital;
pub mod staff;

pub use hospital::HospitalStorage;
pub use staff::StaffStorage;
