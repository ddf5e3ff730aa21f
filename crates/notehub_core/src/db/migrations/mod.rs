//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Hold the ordered schema migration scripts shipped with this build.
//! - Bring an opened database up to the newest version in one transaction.
//!
//! # Invariants
//! - Registry entries carry strictly increasing versions.
//! - `PRAGMA user_version` moves in lockstep with each applied script.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, include_str!("0001_accounts.sql")),
    (2, include_str!("0002_notes.sql")),
    (3, include_str!("0003_tags.sql")),
];

/// Returns the newest schema version this build can migrate to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// Databases already at the newest version pass through untouched. A
/// database ahead of this build is rejected rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let installed = installed_version(conn)?;
    let supported = latest_version();

    if installed > supported {
        return Err(DbError::SchemaAhead {
            found: installed,
            supported,
        });
    }

    let mut pending = MIGRATIONS
        .iter()
        .copied()
        .filter(|(version, _)| *version > installed)
        .peekable();
    if pending.peek().is_none() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        debug!("event=migration_applied module=db version={version}");
    }
    tx.commit()?;

    Ok(())
}

fn installed_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
