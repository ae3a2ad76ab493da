//! Patient directory.
//!
//! Search and lookup statements come from `carebase-search`; this module
//! binds their parameters and decodes rows.

use async_trait::async_trait;
use sqlx_core::query::{Query, query};
use sqlx_postgres::{PgArguments, PgRow, Postgres};

use carebase_core::{Gender, NewPatient, Patient, StorageError, StorageResult};
use carebase_search::{PATIENT_COLUMNS, PatientLookup, PatientSearch, PatientStorage, SqlParam, SqlQuery};

use crate::PostgresStorage;
use crate::error::{database_error, insert_error};
use crate::row::{from_db_id, get, to_db_id};

fn patient_from_row(row: &PgRow) -> StorageResult<Patient> {
    let gender: String = get(row, "gender")?;
    let gender = gender.parse::<Gender>().map_err(|e| StorageError::invalid_record(e))?;

    Ok(Patient {
        id: from_db_id(get(row, "id")?)?,
        hospital_id: from_db_id(get(row, "hospital_id")?)?,
        patient_hn: get(row, "patient_hn")?,
        first_name_th: get(row, "first_name_th")?,
        middle_name_th: get(row, "middle_name_th")?,
        last_name_th: get(row, "last_name_th")?,
        first_name_en: get(row, "first_name_en")?,
        middle_name_en: get(row, "middle_name_en")?,
        last_name_en: get(row, "last_name_en")?,
        date_of_birth: get(row, "date_of_birth")?,
        national_id: get(row, "national_id")?,
        passport_id: get(row, "passport_id")?,
        phone_number: get(row, "phone_number")?,
        email: get(row, "email")?,
        gender,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

/// Binds builder parameters in placeholder order.
fn bind_params(statement: &SqlQuery) -> StorageResult<Query<'_, Postgres, PgArguments>> {
    let mut bound = query(&statement.sql);
    for param in &statement.params {
        bound = match param {
            SqlParam::Text(value) => bound.bind(value.as_str()),
            SqlParam::Date(value) => bound.bind(*value),
            SqlParam::Id(value) => {
                let id = to_db_id(*value)
                    .ok_or_else(|| StorageError::invalid_record(format!("id out of range: {value}")))?;
                bound.bind(id)
            }
        };
    }
    Ok(bound)
}

#[async_trait]
impl PatientStorage for PostgresStorage {
    async fn search(&self, search: &PatientSearch) -> StorageResult<Vec<Patient>> {
        let statement = search.build();

        let rows = bind_params(&statement)?
            .fetch_all(self.pool())
            .await
            .map_err(database_error)?;

        tracing::debug!(
            hospital_id = search.hospital_id(),
            criteria = search.criteria().len(),
            results = rows.len(),
            "Patient search executed"
        );

        rows.iter().map(patient_from_row).collect()
    }

    async fn lookup(&self, lookup: &PatientLookup) -> StorageResult<Option<Patient>> {
        let statement = lookup.build();

        let row = bind_params(&statement)?
            .fetch_optional(self.pool())
            .await
            .map_err(database_error)?;

        row.as_ref().map(patient_from_row).transpose()
    }

    async fn create(&self, patient: NewPatient) -> StorageResult<Patient> {
        let hospital_id = to_db_id(patient.hospital_id)
            .ok_or_else(|| StorageError::not_found("hospital", patient.hospital_id.to_string()))?;

        let sql = format!(
            "INSERT INTO patient (hospital_id, patient_hn, \
                first_name_th, middle_name_th, last_name_th, \
                first_name_en, middle_name_en, last_name_en, \
                date_of_birth, national_id, passport_id, phone_number, email, gender) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PATIENT_COLUMNS}"
        );

        let row = query(&sql)
            .bind(hospital_id)
            .bind(&patient.patient_hn)
            .bind(&patient.first_name_th)
            .bind(&patient.middle_name_th)
            .bind(&patient.last_name_th)
            .bind(&patient.first_name_en)
            .bind(&patient.middle_name_en)
            .bind(&patient.last_name_en)
            .bind(patient.date_of_birth)
            .bind(&patient.national_id)
            .bind(&patient.passport_id)
            .bind(&patient.phone_number)
            .bind(&patient.email)
            .bind(patient.gender.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(|e| insert_error(e, "patient", &patient.patient_hn))?;

        patient_from_row(&row)
    }
}
