//! # carebase-search
//!
//! Translates optional patient search criteria into a tenant-scoped query.
//!
//! - [`PatientFilter`]: the closed set of recognized criteria and the columns
//!   each one reads
//! - [`PatientSearch`]: parsed criteria, rendered to parameterized SQL or
//!   evaluated in memory
//! - [`PatientLookup`]: a single patient by national id or passport id
//! - [`PatientStorage`]: the persistence trait both backends implement
//!
//! Every query carries the caller's hospital id as its first predicate.

pub mod error;
pub mod filter;
pub mod lookup;
pub mod query;
pub mod sql_builder;
pub mod storage;

pub use error::{SearchError, SearchResult};
pub use filter::PatientFilter;
pub use lookup::PatientLookup;
pub use query::{Criterion, FilterValue, PatientSearch};
pub use sql_builder::{SqlBuilder, SqlParam, SqlQuery};
pub use storage::PatientStorage;

/// Table holding patient records.
pub const PATIENT_TABLE: &str = "patient";

/// Columns selected for a patient row, in [`Patient`](carebase_core::Patient)
/// field order.
pub const PATIENT_COLUMNS: &str = "id, hospital_id, patient_hn, \
    first_name_th, middle_name_th, last_name_th, \
    first_name_en, middle_name_en, last_name_en, \
    date_of_birth, national_id, passport_id, phone_number, email, gender, \
    created_at, updated_at";
