//! # carebase-core
//!
//! Domain types shared by every CareBase crate: hospitals, staff, patients,
//! the storage error type used by repository traits, and date/time helpers.

pub mod error;
pub mod model;
pub mod request;
pub mod time;

pub use error::{StorageError, StorageResult};
pub use model::{
    Gender, Hospital, HospitalId, NewHospital, NewPatient, NewStaff, Patient, PatientId, Staff,
    StaffId,
};
pub use crate::time::{now_utc, parse_date};
pub use request::{ErrorBody, current_request_id, with_request_id};
