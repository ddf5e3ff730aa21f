//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note persistence on top of `notes` and `note_tags`.
//! - Keep the note row and its tag links consistent inside one transaction.
//!
//! # Invariants
//! - Callers resolve tag names through the tag registry before linking;
//!   link inserts assume the tag rows exist.
//! - Listings apply exactly the predicate they are given; visibility policy
//!   lives with the caller.
//! - List order is `created_at ASC, uuid ASC` and nothing else.

use crate::model::note::{NewNote, Note, NoteChange, NoteId};
use crate::query::note_filter::NotePredicate;
use crate::repo::{
    ensure_schema_current, parse_bool_flag, parse_uuid, require_table, RepoError, RepoResult,
};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    body,
    author_uuid,
    is_public,
    created_at,
    updated_at
FROM notes";

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note with its tag links and returns its stable id.
    fn insert_note(&self, note: &NewNote) -> RepoResult<NoteId>;
    /// Gets one note by id, tags included.
    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes matching the composed predicate in stable creation order.
    fn list_notes(&self, predicate: &NotePredicate) -> RepoResult<Vec<Note>>;
    /// Rewrites the note row and, when `change.tags` is set, its tag links.
    fn update_note(&self, note_id: NoteId, change: &NoteChange) -> RepoResult<()>;
    /// Deletes the note and its tag links; tag rows stay behind.
    fn delete_note(&self, note_id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Builds a repository after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        require_table(
            conn,
            "notes",
            &[
                "uuid",
                "title",
                "body",
                "author_uuid",
                "is_public",
                "created_at",
                "updated_at",
            ],
        )?;
        require_table(conn, "note_tags", &["note_uuid", "tag_name"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &NewNote) -> RepoResult<NoteId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO notes (uuid, title, body, author_uuid, is_public)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.body.as_str(),
                note.author_uuid.to_string(),
                i64::from(note.is_public),
            ],
        )?;
        insert_tag_links(&tx, note.uuid, &note.tags)?;

        tx.commit()?;
        Ok(note.uuid)
    }

    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([note_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_note(self.conn, row)?));
        }

        Ok(None)
    }

    fn list_notes(&self, predicate: &NotePredicate) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_SELECT_SQL} WHERE {} ORDER BY created_at ASC, uuid ASC;",
            predicate.clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(&predicate.binds))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(read_note(self.conn, row)?);
        }

        Ok(notes)
    }

    fn update_note(&self, note_id: NoteId, change: &NoteChange) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                body = ?3,
                is_public = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                note_id.to_string(),
                change.title.as_str(),
                change.body.as_str(),
                i64::from(change.is_public),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        if let Some(tags) = &change.tags {
            tx.execute(
                "DELETE FROM note_tags WHERE note_uuid = ?1;",
                [note_id.to_string()],
            )?;
            insert_tag_links(&tx, note_id, tags)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_note(&self, note_id: NoteId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM note_tags WHERE note_uuid = ?1;",
            [note_id.to_string()],
        )?;
        let changed = tx.execute("DELETE FROM notes WHERE uuid = ?1;", [note_id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        tx.commit()?;
        Ok(())
    }
}

fn insert_tag_links(tx: &Transaction<'_>, note_id: NoteId, tags: &[String]) -> RepoResult<()> {
    for tag in tags {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, tag_name) VALUES (?1, ?2);",
            params![note_id.to_string(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn read_note(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let author_text: String = row.get("author_uuid")?;
    let tags = load_note_tags(conn, &uuid_text)?;

    Ok(Note {
        uuid: parse_uuid(&uuid_text, "notes.uuid")?,
        title: row.get("title")?,
        body: row.get("body")?,
        author_uuid: parse_uuid(&author_text, "notes.author_uuid")?,
        is_public: parse_bool_flag(row.get("is_public")?, "notes.is_public")?,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_note_tags(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag_name
         FROM note_tags
         WHERE note_uuid = ?1
         ORDER BY tag_name ASC;",
    )?;

    let mut rows = stmt.query([note_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }

    Ok(tags)
}
