//! Recognized patient search criteria.
//!
//! Column names used in SQL come only from this enum, never from request
//! input.

use std::fmt;

use carebase_core::Patient;

/// A recognized search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientFilter {
    NationalId,
    PassportId,
    /// Matches the Thai or the English first name.
    FirstName,
    /// Matches the Thai or the English middle name.
    MiddleName,
    /// Matches the Thai or the English last name.
    LastName,
    FirstNameTh,
    MiddleNameTh,
    LastNameTh,
    FirstNameEn,
    MiddleNameEn,
    LastNameEn,
    DateOfBirth,
    PhoneNumber,
    Email,
}

impl PatientFilter {
    /// Every recognized filter, in parameter-processing order.
    pub const ALL: [PatientFilter; 14] = [
        Self::NationalId,
        Self::PassportId,
        Self::FirstName,
        Self::MiddleName,
        Self::LastName,
        Self::FirstNameTh,
        Self::MiddleNameTh,
        Self::LastNameTh,
        Self::FirstNameEn,
        Self::MiddleNameEn,
        Self::LastNameEn,
        Self::DateOfBirth,
        Self::PhoneNumber,
        Self::Email,
    ];

    /// Looks up a filter by its query parameter name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.key() == key)
    }

    /// The query parameter name.
    pub fn key(self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::PassportId => "passport_id",
            Self::FirstName => "first_name",
            Self::MiddleName => "middle_name",
            Self::LastName => "last_name",
            Self::FirstNameTh => "first_name_th",
            Self::MiddleNameTh => "middle_name_th",
            Self::LastNameTh => "last_name_th",
            Self::FirstNameEn => "first_name_en",
            Self::MiddleNameEn => "middle_name_en",
            Self::LastNameEn => "last_name_en",
            Self::DateOfBirth => "date_of_birth",
            Self::PhoneNumber => "phone_number",
            Self::Email => "email",
        }
    }

    /// Columns the filter compares against. More than one means any may match.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::NationalId => &["national_id"],
            Self::PassportId => &["passport_id"],
            Self::FirstName => &["first_name_th", "first_name_en"],
            Self::MiddleName => &["middle_name_th", "middle_name_en"],
            Self::LastName => &["last_name_th", "last_name_en"],
            Self::FirstNameTh => &["first_name_th"],
            Self::MiddleNameTh => &["middle_name_th"],
            Self::LastNameTh => &["last_name_th"],
            Self::FirstNameEn => &["first_name_en"],
            Self::MiddleNameEn => &["middle_name_en"],
            Self::LastNameEn => &["last_name_en"],
            Self::DateOfBirth => &["date_of_birth"],
            Self::PhoneNumber => &["phone_number"],
            Self::Email => &["email"],
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, Self::DateOfBirth)
    }

    /// Text fields of `patient` this filter reads. Empty for date filters.
    pub(crate) fn text_fields(self, patient: &Patient) -> Vec<Option<&str>> {
        fn field(value: &Option<String>) -> Option<&str> {
            value.as_deref()
        }
        match self {
            Self::NationalId => vec![field(&patient.national_id)],
            Self::PassportId => vec![field(&patient.passport_id)],
            Self::FirstName => vec![field(&patient.first_name_th), field(&patient.first_name_en)],
            Self::MiddleName => vec![
                field(&patient.middle_name_th),
                field(&patient.middle_name_en),
            ],
            Self::LastName => vec![field(&patient.last_name_th), field(&patient.last_name_en)],
            Self::FirstNameTh => vec![field(&patient.first_name_th)],
            Self::MiddleNameTh => vec![field(&patient.middle_name_th)],
            Self::LastNameTh => vec![field(&patient.last_name_th)],
            Self::FirstNameEn => vec![field(&patient.first_name_en)],
            Self::MiddleNameEn => vec![field(&patient.middle_name_en)],
            Self::LastNameEn => vec![field(&patient.last_name_en)],
            Self::DateOfBirth => Vec::new(),
            Self::PhoneNumber => vec![field(&patient.phone_number)],
            Self::Email => vec![field(&patient.email)],
        }
    }
}

impl fmt::Display for PatientFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
