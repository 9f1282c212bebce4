//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded on `conn`.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies all pending migrations on the provided connection.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database was written by a newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending_migrations(current) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        debug!(
            "event=db_migrate_step module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current,
        latest
    );
    Ok(())
}

fn pending_migrations(current: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > current)
}
