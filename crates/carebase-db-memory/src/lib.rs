//! In-memory storage backend for CareBase.
//!
//! Implements the hospital, staff and patient directories on `DashMap`s,
//! with the same uniqueness rules as the PostgreSQL schema. Used for local
//! development (`storage.backend = "memory"`) and tests.
//!
//! # Example
//!
//! ```ignore
//! use carebase_db_memory::InMemoryStorage;
//! use carebase_core::NewHospital;
//!
//! let storage = InMemoryStorage::new();
//! let central = storage.insert_hospital(NewHospital::new("Central"))?;
//! ```

mod storage;

pub use storage::InMemoryStorage;

/// Type alias for a shareable in-memory storage instance.
pub type DynInMemoryStorage = std::sync::Arc<InMemoryStorage>;

/// Creates a new, empty shared in-memory storage.
pub fn create_storage() -> DynInMemoryStorage {
    std::sync::Arc::new(InMemoryStorage::new())
}
