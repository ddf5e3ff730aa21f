//! Tag registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve tag names to stored tags, creating missing ones on the fly.
//! - Keep tag identity exact: one row per distinct name, case included.
//!
//! # Invariants
//! - `resolve` is idempotent; resolving an existing name never duplicates
//!   or errors.
//! - Tags are never deleted here; rows outlive the notes that used them.

use crate::repo::{ensure_schema_current, require_table, RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension};

/// A registered tag. The name is the whole identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
    pub name: String,
}

/// Registry interface for create-or-fetch tag resolution.
pub trait TagRegistry {
    /// Returns the tag with exactly this name, creating it when absent.
    fn resolve(&self, name: &str) -> RepoResult<Tag>;
    /// Resolves every name in input order.
    fn resolve_all(&self, names: &[String]) -> RepoResult<Vec<Tag>>;
    /// Returns all known tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed tag registry.
pub struct SqliteTagRegistry<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRegistry<'conn> {
    /// Builds a registry after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        require_table(conn, "tags", &["name"])?;
        Ok(Self { conn })
    }
}

impl TagRegistry for SqliteTagRegistry<'_> {
    fn resolve(&self, name: &str) -> RepoResult<Tag> {
        // The name primary key makes concurrent resolvers converge on one
        // row without any of them failing.
        self.conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [name])?;

        let stored: Option<String> = self
            .conn
            .query_row("SELECT name FROM tags WHERE name = ?1;", [name], |row| {
                row.get(0)
            })
            .optional()?;

        match stored {
            Some(name) => Ok(Tag { name }),
            None => Err(RepoError::InvalidData(format!(
                "tag `{name}` missing after resolve"
            ))),
        }
    }

    fn resolve_all(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            tags.push(self.resolve(name)?);
        }
        Ok(tags)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM tags ORDER BY name ASC;")?;

        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag { name: row.get(0)? });
        }

        Ok(tags)
    }
}
