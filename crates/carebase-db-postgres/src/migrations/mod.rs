//! Database migration management for the PostgreSQL storage backend.
//!
//! Migrations are embedded in the binary, so deployment needs no SQL files
//! on disk.

use std::borrow::Cow;

use sqlx_core::migrate::{Migration, MigrationType, Migrator};
use sqlx_postgres::PgPool;
use tracing::{info, instrument};

use crate::error::{PostgresError, Result};

/// Embedded migrations, oldest first: (version, description, sql).
///
/// To add a migration, create the SQL file in `migrations/` and append an
/// entry here.
macro_rules! embedded_migrations {
    () => {
        &[(
            20250101000001i64,
            "initial_schema",
            include_str!("../../migrations/20250101000001_initial_schema.sql"),
        )]
    };
}

fn build_migrations() -> Vec<Migration> {
    embedded_migrations!()
        .iter()
        .map(|(version, description, sql)| Migration {
            version: *version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect()
}

/// Runs all pending migrations.
///
/// Applied versions are tracked in the `_sqlx_migrations` table, and an
/// advisory lock keeps concurrent instances from migrating at once.
///
/// # Errors
///
/// Returns `PostgresError::Migration` if a migration fails to execute.
#[instrument(skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
    let migrations = build_migrations();
    info!(count = migrations.len(), "Running database migrations");

    let migrator = Migrator {
        migrations: Cow::Owned(migrations),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| PostgresError::Migration(format!("Migration failed: {e}")))?;

    info!("Database migrations completed successfully");

    Ok(())
}
