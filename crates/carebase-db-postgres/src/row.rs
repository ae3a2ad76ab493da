//! Row decoding and id conversion helpers.

use sqlx_core::decode::Decode;
use sqlx_core::row::Row;
use sqlx_core::types::Type;
use sqlx_postgres::{PgRow, Postgres};

use carebase_core::{StorageError, StorageResult};

use crate::error::database_error;

/// Database ids are `BIGINT`; ids past `i64::MAX` cannot exist.
pub(crate) fn to_db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

pub(crate) fn from_db_id(id: i64) -> StorageResult<u64> {
    u64::try_from(id).map_err(|_| StorageError::invalid_record(format!("negative id {id}")))
}

pub(crate) fn get<'r, T>(row: &'r PgRow, column: &str) -> StorageResult<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(column).map_err(database_error)
}
