//! Staff directory.

use async_trait::async_trait;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use carebase_auth::StaffStorage;
use carebase_core::{HospitalId, NewStaff, Staff, StaffId, StorageError, StorageResult};

use crate::PostgresStorage;
use crate::error::{database_error, insert_error};
use crate::row::{from_db_id, to_db_id};

type StaffTuple = (i64, String, String, i64, OffsetDateTime, OffsetDateTime);

fn from_tuple(row: StaffTuple) -> StorageResult<Staff> {
    Ok(Staff {
        id: from_db_id(row.0)?,
        username: row.1,
        password_hash: row.2,
        hospital_id: from_db_id(row.3)?,
        created_at: row.4,
        updated_at: row.5,
    })
}

#[async_trait]
impl StaffStorage for PostgresStorage {
    async fn find_by_id(&self, id: StaffId) -> StorageResult<Option<Staff>> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(None);
        };

        let row: Option<StaffTuple> = query_as(
            r#"
            SELECT id, username, password_hash, hospital_id, created_at, updated_at
            FROM staff
            WHERE id = $1
            "#,
        )
        .bind(db_id)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error)?;

        row.map(from_tuple).transpose()
    }

    async fn find_by_username(
        &self,
        hospital_id: HospitalId,
        username: &str,
    ) -> StorageResult<Option<Staff>> {
        let Some(db_hospital) = to_db_id(hospital_id) else {
            return Ok(None);
        };

        let row: Option<StaffTuple> = query_as(
            r#"
            SELECT id, username, password_hash, hospital_id, created_at, updated_at
            FROM staff
            WHERE hospital_id = $1
              AND username = $2
            "#,
        )
        .bind(db_hospital)
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(database_error)?;

        row.map(from_tuple).transpose()
    }

    async fn create(&self, staff: NewStaff) -> StorageResult<Staff> {
        let db_hospital = to_db_id(staff.hospital_id)
            .ok_or_else(|| StorageError::not_found("hospital", staff.hospital_id.to_string()))?;

        let row: StaffTuple = query_as(
            r#"
            INSERT INTO staff (username, password_hash, hospital_id)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, hospital_id, created_at, updated_at
            "#,
        )
        .bind(&staff.username)
        .bind(&staff.password_hash)
        .bind(db_hospital)
        .fetch_one(self.pool())
        .await
        .map_err(|e| insert_error(e, "staff", &staff.username))?;

        from_tuple(row)
    }
}
