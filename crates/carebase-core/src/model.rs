//! Hospital, staff, and patient records.
//!
//! Every staff member and every patient belongs to exactly one hospital for
//! its whole lifetime. The hospital id is the tenant partition key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Hospital identifier (tenant partition key).
pub type HospitalId = u64;

/// Staff identifier.
pub type StaffId = u64;

/// Patient identifier.
pub type PatientId = u64;

// =============================================================================
// Hospital
// =============================================================================

/// A hospital: the tenant boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Data needed to create a hospital.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHospital {
    pub name: String,
}

impl NewHospital {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member of one hospital.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Staff {
    pub id: StaffId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub hospital_id: HospitalId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Data needed to create a staff record. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    pub username: String,
    pub password_hash: String,
    pub hospital_id: HospitalId,
}

// =============================================================================
// Patient
// =============================================================================

/// Two-valued sex/gender attribute, stored as `M` or `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(format!("unknown gender code '{other}'")),
        }
    }
}

/// A patient record, owned by one hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub hospital_id: HospitalId,
    /// Hospital number, the business-unique human readable identifier.
    pub patient_hn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_en: Option<String>,
    #[serde(with = "crate::time::date_format")]
    pub date_of_birth: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub gender: Gender,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Data needed to create a patient record.
///
/// Patients have no creation endpoint; this is used by storage backends and
/// test fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub hospital_id: HospitalId,
    pub patient_hn: String,
    pub first_name_th: Option<String>,
    pub middle_name_th: Option<String>,
    pub last_name_th: Option<String>,
    pub first_name_en: Option<String>,
    pub middle_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub date_of_birth: Date,
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub gender: Gender,
}

impl NewPatient {
    /// Starts a patient with only the required fields set.
    pub fn new(
        hospital_id: HospitalId,
        patient_hn: impl Into<String>,
        date_of_birth: Date,
        gender: Gender,
    ) -> Self {
        Self {
            hospital_id,
            patient_hn: patient_hn.into(),
            first_name_th: None,
            middle_name_th: None,
            last_name_th: None,
            first_name_en: None,
            middle_name_en: None,
            last_name_en: None,
            date_of_birth,
            national_id: None,
            passport_id: None,
            phone_number: None,
            email: None,
            gender,
        }
    }

    #[must_use]
    pub fn national_id(mut self, value: impl Into<String>) -> Self {
        self.national_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn passport_id(mut self, value: impl Into<String>) -> Self {
        self.passport_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn name_en(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name_en = Some(first.into());
        self.last_name_en = Some(last.into());
        self
    }

    #[must_use]
    pub fn name_th(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name_th = Some(first.into());
        self.last_name_th = Some(last.into());
        self
    }

    #[must_use]
    pub fn phone_number(mut self, value: impl Into<String>) -> Self {
        self.phone_number = Some(value.into());
        self
    }

    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Materializes the record with storage-assigned id and timestamps.
    pub fn into_patient(self, id: PatientId, now: OffsetDateTime) -> Patient {
        Patient {
            id,
            hospital_id: self.hospital_id,
            patient_hn: self.patient_hn,
            first_name_th: self.first_name_th,
            middle_name_th: self.middle_name_th,
            last_name_th: self.last_name_th,
            first_name_en: self.first_name_en,
            middle_name_en: self.middle_name_en,
            last_name_en: self.last_name_en,
            date_of_birth: self.date_of_birth,
            national_id: self.national_id,
            passport_id: self.passport_id,
            phone_number: self.phone_number,
            email: self.email,
            gender: self.gender,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_staff_password_hash_not_serialized() {
        let staff = Staff {
            id: 7,
            username: "nurse1".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            hospital_id: 1,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        };

        let json = serde_json::to_string(&staff).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"username\":\"nurse1\""));
    }

    #[test]
    fn test_patient_serialization_omits_absent_fields() {
        let patient = NewPatient::new(1, "HN-0001", date!(1990 - 04 - 12), Gender::Female)
            .national_id("NAT001")
            .into_patient(3, datetime!(2024-01-01 0:00 UTC));

        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["national_id"], "NAT001");
        assert_eq!(json["date_of_birth"], "1990-04-12");
        assert_eq!(json["gender"], "F");
        assert!(json.get("passport_id").is_none());
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!("M".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert!("X".parse::<Gender>().is_err());
        assert_eq!(Gender::Male.to_string(), "M");
    }
}
