use notehub_core::db::migrations::latest_version;
use notehub_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn in_memory_database_migrates_to_latest_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_tables_present(&conn, ["users", "notes", "tags", "note_tags"]);
}

#[test]
fn reopening_a_database_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    for attempt in 0..2 {
        let conn = open_db(&path).unwrap();
        assert_eq!(user_version(&conn), latest_version(), "attempt {attempt}");
        assert_tables_present(&conn, ["users", "notes"]);
    }
}

#[test]
fn database_from_a_newer_build_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ahead.db");

    Connection::open(&path)
        .and_then(|conn| conn.execute_batch("PRAGMA user_version = 999;"))
        .unwrap();

    match open_db(&path) {
        Err(DbError::SchemaAhead { found, supported }) => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("expected SchemaAhead, got {other:?}"),
    }
}

#[test]
fn file_connections_run_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");

    let conn = open_db(&path).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO notes (uuid, title, body, author_uuid)
         VALUES (?1, 'orphan', 'body', ?2);",
        [Uuid::new_v4().to_string(), Uuid::new_v4().to_string()],
    );
    assert!(result.is_err(), "insert with unknown author must fail");
}

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_tables_present<'a>(conn: &Connection, tables: impl IntoIterator<Item = &'a str>) {
    for table in tables {
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "expected table {table} in the schema");
    }
}
