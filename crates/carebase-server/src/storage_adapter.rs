//! Storage backend selection.
//!
//! Both backends implement every directory trait on one handle; the server
//! holds that handle once per trait.

use std::sync::Arc;

use carebase_auth::{HospitalStorage, StaffStorage};
use carebase_db_memory::DynInMemoryStorage;
use carebase_db_postgres::PostgresStorage;
use carebase_search::PatientStorage;

use crate::config::{StorageBackend, StorageConfig};

/// Directory handles shared by handlers and the auth gate.
#[derive(Clone)]
pub struct Storage {
    pub hospitals: Arc<dyn HospitalStorage>,
    pub staff: Arc<dyn StaffStorage>,
    pub patients: Arc<dyn PatientStorage>,
}

impl Storage {
    /// Uses one backend for every directory.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: HospitalStorage + StaffStorage + PatientStorage + 'static,
    {
        Self {
            hospitals: backend.clone(),
            staff: backend.clone(),
            patients: backend,
        }
    }

    /// Wraps a shared in-memory store, keeping the caller's handle usable for
    /// seeding.
    pub fn memory(store: &DynInMemoryStorage) -> Self {
        Self::from_backend(store.clone())
    }
}

/// Opens the configured backend.
pub async fn connect(cfg: &StorageConfig) -> anyhow::Result<Storage> {
    match cfg.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Storage::memory(&carebase_db_memory::create_storage()))
        }
        StorageBackend::Postgres => {
            let pg = cfg.postgres.to_postgres_config();
            let storage = PostgresStorage::new(&pg).await?;
            carebase_db_postgres::test_connection(storage.pool()).await?;
            tracing::info!(
                pool_size = pg.pool_size,
                migrations = pg.run_migrations,
                "PostgreSQL storage ready"
            );
            Ok(Storage::from_backend(Arc::new(storage)))
        }
    }
}
