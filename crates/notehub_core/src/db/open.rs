//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file-backed or in-memory SQLite connections.
//! - Apply the pragmas core relies on before anyone queries.
//! - Run migrations so callers only ever see a current schema.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a 5s busy timeout.
//! - File-backed connections run in WAL journal mode.
//! - Returned connections are fully migrated.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionMode {
    File,
    Memory,
}

impl ConnectionMode {
    fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// Several request-scoped connections may point at the same file; WAL mode
/// plus the busy timeout keeps readers from stalling behind a writer.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_connection(ConnectionMode::File, || Connection::open(path.as_ref()))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// In-memory databases keep SQLite's default journal mode; WAL needs a
/// shared database file.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_connection(ConnectionMode::Memory, Connection::open_in_memory)
}

fn open_connection(
    mode: ConnectionMode,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode.label());

    let mut conn = open().map_err(|err| {
        log_open_failure(mode, started_at, "db_open_failed", &err);
        DbError::from(err)
    })?;

    if let Err(err) = bootstrap_connection(&mut conn, mode) {
        log_open_failure(mode, started_at, "db_bootstrap_failed", &err);
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={} duration_ms={}",
        mode.label(),
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn log_open_failure(mode: ConnectionMode, started_at: Instant, code: &str, err: &dyn Display) {
    error!(
        "event=db_open module=db status=error mode={} duration_ms={} error_code={code} error={err}",
        mode.label(),
        started_at.elapsed().as_millis()
    );
}

fn bootstrap_connection(conn: &mut Connection, mode: ConnectionMode) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if mode == ConnectionMode::File {
        // `PRAGMA journal_mode` reports the effective mode as a result row.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    }
    apply_migrations(conn)?;
    Ok(())
}
