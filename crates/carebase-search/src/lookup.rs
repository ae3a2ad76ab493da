//! Single-patient lookup by national id or passport id.

use carebase_core::{HospitalId, Patient};

use crate::sql_builder::{SqlBuilder, SqlParam, SqlQuery};
use crate::{PATIENT_COLUMNS, PATIENT_TABLE};

/// Finds the patient of one hospital whose national id or passport id equals
/// the given identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientLookup {
    pub hospital_id: HospitalId,
    pub identifier: String,
}

impl PatientLookup {
    pub fn new(hospital_id: HospitalId, identifier: impl Into<String>) -> Self {
        Self {
            hospital_id,
            identifier: identifier.into(),
        }
    }

    /// Renders the lookup as a parameterized `SELECT ... LIMIT 1`.
    ///
    /// A national id match is preferred over a passport id match.
    pub fn build(&self) -> SqlQuery {
        let mut builder = SqlBuilder::new();
        builder.add_equals_any(&["hospital_id"], SqlParam::Id(self.hospital_id));
        builder.add_equals_any(
            &["national_id", "passport_id"],
            SqlParam::Text(self.identifier.clone()),
        );

        let mut query = builder.into_select(
            PATIENT_COLUMNS,
            PATIENT_TABLE,
            Some("(national_id IS NOT DISTINCT FROM $2) DESC, id"),
        );
        query.sql.push_str(" LIMIT 1");
        query
    }

    /// Evaluates the lookup against one record.
    pub fn matches(&self, patient: &Patient) -> bool {
        let id = Some(self.identifier.as_str());
        patient.hospital_id == self.hospital_id
            && (patient.national_id.as_deref() == id || patient.passport_id.as_deref() == id)
    }

    /// Picks the best match from candidate records.
    pub fn select<'a, I>(&self, patients: I) -> Option<&'a Patient>
    where
        I: IntoIterator<Item = &'a Patient>,
    {
        let mut best: Option<&Patient> = None;
        for patient in patients.into_iter().filter(|p| self.matches(p)) {
            let by_national = patient.national_id.as_deref() == Some(self.identifier.as_str());
            best = match best {
                None => Some(patient),
                Some(current) => {
                    let current_national =
                        current.national_id.as_deref() == Some(self.identifier.as_str());
                    if (by_national && !current_national)
                        || (by_national == current_national && patient.id < current.id)
                    {
                        Some(patient)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }
}
