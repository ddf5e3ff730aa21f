//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write payloads are validated by services before they reach a
//!   repository; repositories enforce storage integrity on the way out.
//! - Repository APIs return semantic errors (`NotFound`, `UsernameTaken`)
//!   in addition to DB transport errors.
//! - Repository handles are only constructed over migrated connections;
//!   `try_new` verifies schema version and required tables.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod note_repo;
pub mod tag_registry;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared error for all repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Transport or bootstrap failure in the SQLite layer.
    Db(DbError),
    /// No row exists for the requested id.
    NotFound(Uuid),
    /// Another account already holds the requested username.
    UsernameTaken(String),
    /// A stored row cannot be decoded into its read model.
    InvalidData(String),
    /// The connection's schema version differs from the one this build
    /// migrates to.
    SchemaMismatch { required: u32, found: u32 },
    /// A table the repository depends on is absent.
    TableMissing(&'static str),
    /// A column the repository depends on is absent.
    ColumnMissing {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UsernameTaken(username) => {
                write!(f, "username is already taken: {username}")
            }
            Self::InvalidData(message) => write!(f, "corrupt stored data: {message}"),
            Self::SchemaMismatch { required, found } => write!(
                f,
                "connection is at schema version {found}, repositories need {required}"
            ),
            Self::TableMissing(table) => {
                write!(f, "storage is missing table `{table}`")
            }
            Self::ColumnMissing { table, column } => {
                write!(f, "storage is missing column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection carries the schema version this binary expects.
pub(crate) fn ensure_schema_current(conn: &Connection) -> RepoResult<()> {
    let required = latest_version();
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found == required {
        Ok(())
    } else {
        Err(RepoError::SchemaMismatch { required, found })
    }
}

/// Verifies a table and its required columns exist.
pub(crate) fn require_table(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::TableMissing(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::ColumnMissing { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2;",
            [table, column],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Parses a stored uuid, naming the offending column on failure.
pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("column {column} holds a malformed uuid `{value}`"))
    })
}

/// Parses a stored 0/1 flag, rejecting any other value.
pub(crate) fn parse_bool_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "column {column} holds a non-flag value `{other}`"
        ))),
    }
}
