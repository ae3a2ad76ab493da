//! Hospital storage trait.

use async_trait::async_trait;

use carebase_core::{Hospital, HospitalId, NewHospital, StorageResult};

/// Storage for hospitals, the tenant boundary.
#[async_trait]
pub trait HospitalStorage: Send + Sync {
    /// Find a hospital by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: HospitalId) -> StorageResult<Option<Hospital>>;

    /// Find a hospital by its exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Hospital>>;

    /// Create a hospital.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the name is taken.
    async fn create(&self, hospital: NewHospital) -> StorageResult<Hospital>;

    /// Resolve a path reference to a hospital.
    ///
    /// A reference that parses as an id is looked up by id first; anything
    /// that does not resolve that way is looked up by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn resolve(&self, reference: &str) -> StorageResult<Option<Hospital>> {
        if let Ok(id) = reference.parse::<HospitalId>()
            && let Some(hospital) = self.find_by_id(id).await?
        {
            return Ok(Some(hospital));
        }
        self.find_by_name(reference).await
    }
}
