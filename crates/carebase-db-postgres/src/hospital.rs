//! Hospital directory.

use async_trait::async_trait;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use carebase_auth::HospitalStorage;
use carebase_core::{Hospital, HospitalId, NewHospital, StorageError, StorageResult};

use crate::PostgresStorage;
use crate::error::{database_error, insert_error};
use crate::row::{from_db_id, to_db_id};

type HospitalTuple = (i64, String, OffsetDateTime, OffsetDateTime);

fn from_tuple(row: HospitalTuple) -> StorageResult<Hospital> {
    Ok(Hospital {
        id: from_db_id(row.0)?,
        name: row.1,
        created_at: row.2,
        updated_at: row.3,
    })
}

#[async_trait]
impl HospitalStorage for PostgresStorage {
    async fn find_by_id(&self, id: HospitalId) -> StorageResult<Option<Hospital>> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(None);
        };

        let row: Option<HospitalTuple> = query_as(
            r#"
            SELECT id, name, created_at, updated_at
            FROM hospital
            WHERE id = $1
            "#,
        )
        .bind(db_id)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error)?;

        row.map(from_tuple).transpose()
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Option<Hospital>> {
        let row: Option<HospitalTuple> = query_as(
            r#"
            SELECT id, name, created_at, updated_at
            FROM hospital
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error)?;

        row.map(from_tuple).transpose()
    }

    async fn create(&self, hospital: NewHospital) -> StorageResult<Hospital> {
        if hospital.name.is_empty() {
            return Err(StorageError::invalid_record("hospital name is empty"));
        }

        let row: HospitalTuple = query_as(
            r#"
            INSERT INTO hospital (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&hospital.name)
        .fetch_one(self.pool())
        .await
        .map_err(|e| insert_error(e, "hospital", &hospital.name))?;

        tracing::debug!(hospital_id = row.0, name = %row.1, "Hospital created");

        from_tuple(row)
    }
}
