use notehub_core::db::{open_db, open_db_in_memory};
use notehub_core::{
    Identity, NewUser, NoteDraft, NoteService, SqliteNoteRepository, SqliteTagRegistry,
    SqliteUserRepository, TagRegistry, TagsInput, UserService,
};
use rusqlite::Connection;
use std::sync::Barrier;
use std::thread;

#[test]
fn resolve_creates_missing_tag() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteTagRegistry::try_new(&conn).unwrap();

    let tag = registry.resolve("work").unwrap();

    assert_eq!(tag.name, "work");
    assert_eq!(tag_count(&conn), 1);
}

#[test]
fn resolve_of_existing_tag_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteTagRegistry::try_new(&conn).unwrap();

    let first = registry.resolve("work").unwrap();
    let second = registry.resolve("work").unwrap();

    assert_eq!(first, second);
    assert_eq!(tag_count(&conn), 1);
}

#[test]
fn concurrent_resolvers_converge_on_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tags.db");
    // The first open migrates the file; the threads below only race the insert.
    drop(open_db(&path).unwrap());

    let barrier = Barrier::new(2);
    thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(|| {
                let conn = open_db(&path).unwrap();
                let registry = SqliteTagRegistry::try_new(&conn).unwrap();
                for _ in 0..50 {
                    barrier.wait();
                    registry.resolve("racy").unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    assert_eq!(tag_count(&conn), 1);
}

#[test]
fn resolve_treats_casing_as_distinct_names() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteTagRegistry::try_new(&conn).unwrap();

    registry.resolve("Work").unwrap();
    registry.resolve("work").unwrap();

    assert_eq!(tag_count(&conn), 2);
    let names: Vec<String> = registry
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["Work".to_string(), "work".to_string()]);
}

#[test]
fn resolve_all_preserves_input_order() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteTagRegistry::try_new(&conn).unwrap();

    let names = vec![
        "zebra".to_string(),
        "alpha".to_string(),
        "zebra".to_string(),
    ];
    let resolved = registry.resolve_all(&names).unwrap();

    let resolved_names: Vec<&str> = resolved.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(resolved_names, vec!["zebra", "alpha", "zebra"]);
    assert_eq!(tag_count(&conn), 2);
}

#[test]
fn list_tags_returns_names_sorted() {
    let conn = open_db_in_memory().unwrap();
    let registry = SqliteTagRegistry::try_new(&conn).unwrap();

    for name in ["pending", "Archive", "draft"] {
        registry.resolve(name).unwrap();
    }

    let names: Vec<String> = registry
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    // BINARY collation: uppercase sorts ahead of lowercase.
    assert_eq!(
        names,
        vec![
            "Archive".to_string(),
            "draft".to_string(),
            "pending".to_string()
        ]
    );
}

#[test]
fn note_creation_registers_new_tags() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(
        SqliteNoteRepository::try_new(&conn).unwrap(),
        SqliteTagRegistry::try_new(&conn).unwrap(),
    );

    let author = users
        .register_user(
            &Identity::Anonymous,
            NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                credential: "argon2-hash".to_string(),
            },
        )
        .unwrap();
    let actor = Identity::User(author.id);

    notes
        .create_note(
            &actor,
            NoteDraft {
                title: "Planning".to_string(),
                body: "next steps".to_string(),
                tags: Some(TagsInput::Many(vec![
                    "roadmap".to_string(),
                    "q3".to_string(),
                ])),
                ..NoteDraft::default()
            },
        )
        .unwrap();

    let names: Vec<String> = notes
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["q3".to_string(), "roadmap".to_string()]);
}

fn tag_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tags;", [], |row| row.get(0))
        .unwrap()
}
