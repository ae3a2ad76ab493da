//! Patient search criteria.
//!
//! A [`PatientSearch`] is a conjunction of exact, case-sensitive matches
//! inside one hospital. The same criteria render to SQL for PostgreSQL and
//! evaluate directly against records for the in-memory backend.

use time::Date;

use carebase_core::{HospitalId, Patient, parse_date};

use crate::error::{SearchError, SearchResult};
use crate::filter::PatientFilter;
use crate::sql_builder::{SqlBuilder, SqlParam, SqlQuery};
use crate::{PATIENT_COLUMNS, PATIENT_TABLE};

/// A parsed criterion value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Date(Date),
}

impl FilterValue {
    fn to_param(&self) -> SqlParam {
        match self {
            Self::Text(s) => SqlParam::Text(s.clone()),
            Self::Date(d) => SqlParam::Date(*d),
        }
    }
}

/// One filter and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub filter: PatientFilter,
    pub value: FilterValue,
}

/// Hospital-scoped patient search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSearch {
    hospital_id: HospitalId,
    criteria: Vec<Criterion>,
}

impl PatientSearch {
    /// A search returning every patient of the hospital.
    pub fn new(hospital_id: HospitalId) -> Self {
        Self {
            hospital_id,
            criteria: Vec::new(),
        }
    }

    /// Builds a search from query parameters.
    ///
    /// Unknown keys are ignored and empty values are omitted. When a key
    /// repeats, its first value is used.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidValue` when `date_of_birth` is not a
    /// `YYYY-MM-DD` date.
    pub fn from_params<I, K, V>(hospital_id: HospitalId, params: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut search = Self::new(hospital_id);

        for (key, value) in params {
            let Some(filter) = PatientFilter::from_key(key.as_ref()) else {
                continue;
            };
            let value = value.as_ref();
            if value.is_empty() || search.criterion(filter).is_some() {
                continue;
            }
            search = search.with(filter, value)?;
        }

        tracing::debug!(
            hospital_id,
            criteria = search.criteria.len(),
            "Patient search parsed"
        );

        Ok(search)
    }

    /// Adds a criterion, parsing the value for the filter's type.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidValue` for an unparseable date.
    pub fn with(mut self, filter: PatientFilter, value: &str) -> SearchResult<Self> {
        let value = if filter.is_date() {
            let date = parse_date(value).map_err(|e| {
                SearchError::invalid_value(filter.key(), format!("expected YYYY-MM-DD: {e}"))
            })?;
            FilterValue::Date(date)
        } else {
            FilterValue::Text(value.to_string())
        };

        self.criteria.push(Criterion { filter, value });
        Ok(self)
    }

    pub fn hospital_id(&self) -> HospitalId {
        self.hospital_id
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// The value given for `filter`, if any.
    pub fn criterion(&self, filter: PatientFilter) -> Option<&FilterValue> {
        self.criteria
            .iter()
            .find(|c| c.filter == filter)
            .map(|c| &c.value)
    }

    /// Renders the search as a parameterized `SELECT`, ordered by id.
    ///
    /// `$1` is always the hospital id.
    pub fn build(&self) -> SqlQuery {
        let mut builder = SqlBuilder::new();
        builder.add_equals_any(&["hospital_id"], SqlParam::Id(self.hospital_id));

        for criterion in &self.criteria {
            builder.add_equals_any(criterion.filter.columns(), criterion.value.to_param());
        }

        builder.into_select(PATIENT_COLUMNS, PATIENT_TABLE, Some("id"))
    }

    /// Evaluates the search against one record.
    pub fn matches(&self, patient: &Patient) -> bool {
        patient.hospital_id == self.hospital_id
            && self.criteria.iter().all(|c| criterion_matches(c, patient))
    }
}

fn criterion_matches(criterion: &Criterion, patient: &Patient) -> bool {
    match &criterion.value {
        FilterValue::Date(date) => patient.date_of_birth == *date,
        FilterValue::Text(value) => criterion
            .filter
            .text_fields(patient)
            .into_iter()
            .any(|field| field == Some(value.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebase_core::{Gender, NewPatient};
    use time::macros::{date, datetime};

    fn patient(id: u64, hospital_id: u64) -> Patient {
        NewPatient::new(hospital_id, format!("HN-{id}"), date!(1990 - 04 - 12), Gender::Female)
            .national_id(format!("NAT00{id}"))
            .name_en("Jane", "Doe")
            .name_th("สมศรี", "ใจดี")
            .into_patient(id, datetime!(2024-01-01 0:00 UTC))
    }

    #[test]
    fn test_no_criteria_scopes_to_hospital() {
        let search = PatientSearch::from_params(3, Vec::<(String, String)>::new()).unwrap();
        let query = search.build();

        assert_eq!(
            query.sql,
            format!("SELECT {PATIENT_COLUMNS} FROM patient WHERE hospital_id = $1 ORDER BY id")
        );
        assert_eq!(query.params, vec![SqlParam::Id(3)]);
    }

    #[test]
    fn test_criteria_become_bind_parameters() {
        let search = PatientSearch::from_params(
            1,
            [("national_id", "NAT001"), ("first_name", "Jane"), ("email", "")],
        )
        .unwrap();
        let query = search.build();

        assert!(query.sql.contains(
            "WHERE hospital_id = $1 AND national_id = $2 AND (first_name_th = $3 OR first_name_en = $3)"
        ));
        assert_eq!(
            query.params,
            vec![
                SqlParam::Id(1),
                SqlParam::Text("NAT001".into()),
                SqlParam::Text("Jane".into()),
            ]
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let search =
            PatientSearch::from_params(1, [("last_name", "x' OR '1'='1")]).unwrap();
        let query = search.build();

        assert!(!query.sql.contains("OR '1'"));
        assert_eq!(query.params[1], SqlParam::Text("x' OR '1'='1".into()));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let search = PatientSearch::from_params(
            1,
            [("hospital_id", "2"), ("id; DROP TABLE patient", "x"), ("email", "a@b.c")],
        )
        .unwrap();

        assert_eq!(search.criteria().len(), 1);
        assert_eq!(search.build().params.len(), 2);
    }

    #[test]
    fn test_repeated_key_uses_first_value() {
        let search =
            PatientSearch::from_params(1, [("email", "first@x"), ("email", "second@x")]).unwrap();

        assert_eq!(
            search.criterion(PatientFilter::Email),
            Some(&FilterValue::Text("first@x".into()))
        );
    }

    #[test]
    fn test_date_of_birth_validation() {
        let search = PatientSearch::from_params(1, [("date_of_birth", "1990-04-12")]).unwrap();
        assert_eq!(
            search.criterion(PatientFilter::DateOfBirth),
            Some(&FilterValue::Date(date!(1990 - 04 - 12)))
        );

        let err = PatientSearch::from_params(1, [("date_of_birth", "12/04/1990")]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::InvalidValue {
                param: "date_of_birth",
                ..
            }
        ));
    }

    #[test]
    fn test_matches_in_memory() {
        let record = patient(1, 1);

        let by_name = PatientSearch::from_params(1, [("last_name", "ใจดี")]).unwrap();
        assert!(by_name.matches(&record));

        let by_en = PatientSearch::from_params(1, [("last_name_en", "Doe")]).unwrap();
        assert!(by_en.matches(&record));

        let wrong_locale = PatientSearch::from_params(1, [("last_name_th", "Doe")]).unwrap();
        assert!(!wrong_locale.matches(&record));

        let case_sensitive = PatientSearch::from_params(1, [("first_name", "jane")]).unwrap();
        assert!(!case_sensitive.matches(&record));

        let by_date = PatientSearch::from_params(1, [("date_of_birth", "1990-04-12")]).unwrap();
        assert!(by_date.matches(&record));

        let absent_field = PatientSearch::from_params(1, [("passport_id", "P1")]).unwrap();
        assert!(!absent_field.matches(&record));
    }

    #[test]
    fn test_matches_enforces_hospital() {
        let record = patient(1, 2);
        assert!(!PatientSearch::new(1).matches(&record));
        assert!(PatientSearch::new(2).matches(&record));
    }
}
