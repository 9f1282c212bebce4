//! Connection lifecycle for the birthday SQLite store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//! - Close connections explicitly so close-time failures are observable.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every connection waits at most `BUSY_TIMEOUT` for a competing writer.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// Used by tests and by hosts that do not need durability.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

/// Closes a connection, surfacing any error SQLite reports on close.
///
/// Dropping a connection also closes it, but silently discards errors.
pub fn close_db(conn: Connection) -> DbResult<()> {
    match conn.close() {
        Ok(()) => {
            info!("event=db_close module=db status=ok");
            Ok(())
        }
        Err((_conn, err)) => {
            warn!("event=db_close module=db status=error error={}", err);
            Err(DbError::Sqlite(err))
        }
    }
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode);

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
