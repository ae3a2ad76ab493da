use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use carebase_auth::{HospitalStorage, StaffStorage};
use carebase_core::{
    Hospital, HospitalId, NewHospital, NewPatient, NewStaff, Patient, PatientId, Staff, StaffId,
    StorageError, StorageResult, now_utc,
};
use carebase_search::{PatientLookup, PatientSearch, PatientStorage};

/// Unique patient attributes, reserved before a record becomes visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PatientKey {
    HospitalNumber(String),
    NationalId(String),
    PassportId(String),
}

impl PatientKey {
    fn describe(&self) -> String {
        match self {
            Self::HospitalNumber(v) => format!("patient_hn={v}"),
            Self::NationalId(v) => format!("national_id={v}"),
            Self::PassportId(v) => format!("passport_id={v}"),
        }
    }
}

/// In-memory storage backend.
///
/// Each table is a `DashMap` keyed by id, with secondary maps enforcing
/// uniqueness. Ids come from per-table atomic counters starting at 1.
#[derive(Debug)]
pub struct InMemoryStorage {
    hospitals: DashMap<HospitalId, Hospital>,
    hospital_names: DashMap<String, HospitalId>,
    staff: DashMap<StaffId, Staff>,
    staff_usernames: DashMap<(HospitalId, String), StaffId>,
    patients: DashMap<PatientId, Patient>,
    patient_keys: DashMap<PatientKey, PatientId>,
    hospital_seq: AtomicU64,
    staff_seq: AtomicU64,
    patient_seq: AtomicU64,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self {
            hospitals: DashMap::new(),
            hospital_names: DashMap::new(),
            staff: DashMap::new(),
            staff_usernames: DashMap::new(),
            patients: DashMap::new(),
            patient_keys: DashMap::new(),
            hospital_seq: AtomicU64::new(1),
            staff_seq: AtomicU64::new(1),
            patient_seq: AtomicU64::new(1),
        }
    }

    /// Inserts a hospital.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` for a taken name and `InvalidRecord` for an
    /// empty one.
    pub fn insert_hospital(&self, hospital: NewHospital) -> StorageResult<Hospital> {
        if hospital.name.is_empty() {
            return Err(StorageError::invalid_record("hospital name is empty"));
        }

        match self.hospital_names.entry(hospital.name.clone()) {
            Entry::Occupied(_) => Err(StorageError::already_exists("hospital", hospital.name)),
            Entry::Vacant(slot) => {
                let now = now_utc();
                let created = Hospital {
                    id: self.hospital_seq.fetch_add(1, Ordering::SeqCst),
                    name: hospital.name,
                    created_at: now,
                    updated_at: now,
                };
                self.hospitals.insert(created.id, created.clone());
                slot.insert(created.id);
                Ok(created)
            }
        }
    }

    /// Inserts a staff member.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown hospital and `AlreadyExists` when the
    /// username is taken in that hospital.
    pub fn insert_staff(&self, staff: NewStaff) -> StorageResult<Staff> {
        if !self.hospitals.contains_key(&staff.hospital_id) {
            return Err(StorageError::not_found(
                "hospital",
                staff.hospital_id.to_string(),
            ));
        }

        match self
            .staff_usernames
            .entry((staff.hospital_id, staff.username.clone()))
        {
            Entry::Occupied(_) => Err(StorageError::already_exists("staff", staff.username)),
            Entry::Vacant(slot) => {
                let now = now_utc();
                let created = Staff {
                    id: self.staff_seq.fetch_add(1, Ordering::SeqCst),
                    username: staff.username,
                    password_hash: staff.password_hash,
                    hospital_id: staff.hospital_id,
                    created_at: now,
                    updated_at: now,
                };
                self.staff.insert(created.id, created.clone());
                slot.insert(created.id);
                Ok(created)
            }
        }
    }

    /// Inserts a patient. Patients have no HTTP creation path, so fixtures and
    /// seeding go through here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown hospital and `AlreadyExists` when the
    /// hospital number, national id or passport id is taken.
    pub fn insert_patient(&self, patient: NewPatient) -> StorageResult<Patient> {
        if !self.hospitals.contains_key(&patient.hospital_id) {
            return Err(StorageError::not_found(
                "hospital",
                patient.hospital_id.to_string(),
            ));
        }

        let mut keys = vec![PatientKey::HospitalNumber(patient.patient_hn.clone())];
        keys.extend(patient.national_id.clone().map(PatientKey::NationalId));
        keys.extend(patient.passport_id.clone().map(PatientKey::PassportId));

        let id = self.patient_seq.fetch_add(1, Ordering::SeqCst);
        let mut reserved = Vec::with_capacity(keys.len());
        for key in keys {
            // The entry guard must be released before touching other keys.
            let claimed = match self.patient_keys.entry(key.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(id);
                    true
                }
            };

            if !claimed {
                for taken in reserved {
                    self.patient_keys.remove(&taken);
                }
                return Err(StorageError::already_exists("patient", key.describe()));
            }
            reserved.push(key);
        }

        let created = patient.into_patient(id, now_utc());
        self.patients.insert(id, created.clone());
        Ok(created)
    }

    /// Number of stored patients.
    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }

    /// Removes a staff member. Tokens naming it stop authenticating.
    pub fn remove_staff(&self, id: StaffId) -> Option<Staff> {
        let (_, staff) = self.staff.remove(&id)?;
        self.staff_usernames
            .remove(&(staff.hospital_id, staff.username.clone()));
        Some(staff)
    }
}

#[async_trait]
impl HospitalStorage for InMemoryStorage {
    async fn find_by_id(&self, id: HospitalId) -> StorageResult<Option<Hospital>> {
        Ok(self.hospitals.get(&id).map(|h| h.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Hospital>> {
        let Some(id) = self.hospital_names.get(name).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.hospitals.get(&id).map(|h| h.value().clone()))
    }

    async fn create(&self, hospital: NewHospital) -> StorageResult<Hospital> {
        let created = self.insert_hospital(hospital)?;
        tracing::debug!(hospital_id = created.id, name = %created.name, "Hospital created");
        Ok(created)
    }
}

#[async_trait]
impl StaffStorage for InMemoryStorage {
    async fn find_by_id(&self, id: StaffId) -> StorageResult<Option<Staff>> {
        Ok(self.staff.get(&id).map(|s| s.value().clone()))
    }

    async fn find_by_username(
        &self,
        hospital_id: HospitalId,
        username: &str,
    ) -> StorageResult<Option<Staff>> {
        let key = (hospital_id, username.to_string());
        let Some(id) = self.staff_usernames.get(&key).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.staff.get(&id).map(|s| s.value().clone()))
    }

    async fn create(&self, staff: NewStaff) -> StorageResult<Staff> {
        self.insert_staff(staff)
    }
}

#[async_trait]
impl PatientStorage for InMemoryStorage {
    async fn search(&self, search: &PatientSearch) -> StorageResult<Vec<Patient>> {
        let mut found: Vec<Patient> = self
            .patients
            .iter()
            .filter(|entry| search.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|p| p.id);
        Ok(found)
    }

    async fn lookup(&self, lookup: &PatientLookup) -> StorageResult<Option<Patient>> {
        let candidates: Vec<Patient> = self
            .patients
            .iter()
            .filter(|entry| lookup.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(lookup.select(candidates.iter()).cloned())
    }

    async fn create(&self, patient: NewPatient) -> StorageResult<Patient> {
        self.insert_patient(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebase_core::Gender;
    use time::macros::date;

    fn storage_with_hospitals() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage.insert_hospital(NewHospital::new("Central")).unwrap();
        storage
            .insert_hospital(NewHospital::new("Green Valley"))
            .unwrap();
        storage
    }

    fn new_staff(hospital_id: HospitalId, username: &str) -> NewStaff {
        NewStaff {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            hospital_id,
        }
    }

    fn new_patient(hospital_id: HospitalId, hn: &str) -> NewPatient {
        NewPatient::new(hospital_id, hn, date!(1990 - 04 - 12), Gender::Female)
    }

    #[tokio::test]
    async fn test_hospital_lookup_and_resolve() {
        let storage = storage_with_hospitals();

        let central = storage.find_by_name("Central").await.unwrap().unwrap();
        assert_eq!(central.id, 1);
        assert_eq!(
            HospitalStorage::find_by_id(&storage, 2).await.unwrap().unwrap().name,
            "Green Valley"
        );

        assert_eq!(storage.resolve("2").await.unwrap().unwrap().name, "Green Valley");
        assert_eq!(storage.resolve("Central").await.unwrap().unwrap().id, 1);
        assert!(storage.resolve("99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_numeric_name_falls_back_to_name() {
        let storage = storage_with_hospitals();
        let numeric = storage.insert_hospital(NewHospital::new("2024")).unwrap();
        let shadowed = storage.insert_hospital(NewHospital::new("1")).unwrap();

        // No hospital has id 2024, so the name matches
        assert_eq!(storage.resolve("2024").await.unwrap().unwrap().id, numeric.id);
        // Id 1 exists and wins over the name
        assert_eq!(storage.resolve("1").await.unwrap().unwrap().name, "Central");
        assert_ne!(shadowed.id, 1);
    }

    #[tokio::test]
    async fn test_hospital_names_unique() {
        let storage = storage_with_hospitals();

        let err = storage.insert_hospital(NewHospital::new("Central")).unwrap_err();
        assert!(err.is_already_exists());

        let err = storage.insert_hospital(NewHospital::new("")).unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_staff_username_unique_per_hospital() {
        let storage = storage_with_hospitals();

        storage.insert_staff(new_staff(1, "nurse1")).unwrap();
        assert!(storage
            .insert_staff(new_staff(1, "nurse1"))
            .unwrap_err()
            .is_already_exists());
        storage.insert_staff(new_staff(2, "nurse1")).unwrap();

        let found = storage.find_by_username(2, "nurse1").await.unwrap().unwrap();
        assert_eq!(found.hospital_id, 2);
        assert!(storage.find_by_username(1, "nurse2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_staff_requires_hospital() {
        let storage = storage_with_hospitals();
        let err = storage.insert_staff(new_staff(9, "ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_staff() {
        let storage = storage_with_hospitals();
        let staff = storage.insert_staff(new_staff(1, "nurse1")).unwrap();

        assert!(storage.remove_staff(staff.id).is_some());
        assert!(StaffStorage::find_by_id(&storage, staff.id).await.unwrap().is_none());
        storage.insert_staff(new_staff(1, "nurse1")).unwrap();
    }

    #[tokio::test]
    async fn test_patient_identifiers_unique() {
        let storage = storage_with_hospitals();
        storage
            .insert_patient(new_patient(1, "HN1").national_id("NAT001"))
            .unwrap();

        let dup_national = storage.insert_patient(new_patient(2, "HN2").national_id("NAT001"));
        assert!(dup_national.unwrap_err().is_already_exists());

        let dup_hn = storage.insert_patient(new_patient(1, "HN1"));
        assert!(dup_hn.unwrap_err().is_already_exists());

        // A failed insert releases the keys it reserved.
        storage
            .insert_patient(new_patient(2, "HN2").passport_id("P1"))
            .unwrap();
        assert_eq!(storage.patient_count(), 2);

        // Absent identifiers never collide.
        storage.insert_patient(new_patient(1, "HN3")).unwrap();
        storage.insert_patient(new_patient(1, "HN4")).unwrap();
    }

    #[tokio::test]
    async fn test_search_is_scoped_and_ordered() {
        let storage = storage_with_hospitals();
        storage
            .insert_patient(new_patient(1, "HN1").name_en("Jane", "Doe"))
            .unwrap();
        storage
            .insert_patient(new_patient(2, "HN2").name_en("Jane", "Doe"))
            .unwrap();
        storage
            .insert_patient(new_patient(1, "HN3").name_en("John", "Doe"))
            .unwrap();

        let all = storage.search(&PatientSearch::new(1)).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);

        let janes = PatientSearch::from_params(1, [("first_name", "Jane")]).unwrap();
        let found = storage.search(&janes).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient_hn, "HN1");
    }

    #[tokio::test]
    async fn test_lookup_by_either_identifier() {
        let storage = storage_with_hospitals();
        storage
            .insert_patient(new_patient(1, "HN1").national_id("NAT001"))
            .unwrap();
        storage
            .insert_patient(new_patient(1, "HN2").passport_id("P-77"))
            .unwrap();

        let by_national = storage.lookup(&PatientLookup::new(1, "NAT001")).await.unwrap();
        assert_eq!(by_national.unwrap().patient_hn, "HN1");

        let by_passport = storage.lookup(&PatientLookup::new(1, "P-77")).await.unwrap();
        assert_eq!(by_passport.unwrap().patient_hn, "HN2");

        let other_tenant = storage.lookup(&PatientLookup::new(2, "NAT001")).await.unwrap();
        assert!(other_tenant.is_none());
    }
}
