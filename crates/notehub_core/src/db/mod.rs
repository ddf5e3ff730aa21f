//! SQLite bootstrap: connection opening and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the NoteHub core.
//! - Walk the database to the schema version this build expects.
//!
//! # Invariants
//! - The installed schema version lives in `PRAGMA user_version`.
//! - Application tables are off-limits until migrations have finished.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Error surfaced by the rusqlite driver.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; migrating would lose data.
    SchemaAhead { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaAhead { found, supported } => write!(
                f,
                "database schema version {found} is ahead of this build (supports up to {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaAhead { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
