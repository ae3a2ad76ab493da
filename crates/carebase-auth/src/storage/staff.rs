//! Staff storage trait.

use async_trait::async_trait;

use carebase_core::{HospitalId, NewStaff, Staff, StaffId, StorageResult};

/// Storage for staff accounts.
///
/// Usernames are unique per hospital, so every username lookup is scoped.
#[async_trait]
pub trait StaffStorage: Send + Sync {
    /// Find a staff member by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: StaffId) -> StorageResult<Option<Staff>>;

    /// Find a staff member by username within one hospital.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(
        &self,
        hospital_id: HospitalId,
        username: &str,
    ) -> StorageResult<Option<Staff>>;

    /// Create a staff member.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if `(username, hospital_id)` is
    /// taken.
    async fn create(&self, staff: NewStaff) -> StorageResult<Staff>;
}
