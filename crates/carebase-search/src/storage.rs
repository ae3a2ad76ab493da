//! Patient storage trait.

use async_trait::async_trait;

use carebase_core::{NewPatient, Patient, StorageResult};

use crate::lookup::PatientLookup;
use crate::query::PatientSearch;

/// Storage for patient records. Every read is scoped to one hospital by the
/// query value it receives.
#[async_trait]
pub trait PatientStorage: Send + Sync {
    /// Run a search, returning all matches ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn search(&self, search: &PatientSearch) -> StorageResult<Vec<Patient>>;

    /// Find one patient by national id or passport id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn lookup(&self, lookup: &PatientLookup) -> StorageResult<Option<Patient>>;

    /// Create a patient record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the national id or passport id
    /// is already registered.
    async fn create(&self, patient: NewPatient) -> StorageResult<Patient>;
}
