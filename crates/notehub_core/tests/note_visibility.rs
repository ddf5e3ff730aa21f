use notehub_core::db::open_db_in_memory;
use notehub_core::{
    Identity, NewUser, NoteDraft, NoteFilter, NotePatch, NoteService, NoteServiceError,
    SharingMode, SqliteNoteRepository, SqliteTagRegistry, SqliteUserRepository, UpdateMode,
    UserService,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn owner_has_full_control_over_private_note() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);
    let alice = register(&conn, "alice");

    let created = notes
        .create_note(&alice, draft("Secret", "only mine"))
        .unwrap();

    assert!(notes.get_note(&alice, created.id).is_ok());
    let updated = notes
        .update_note(
            &alice,
            created.id,
            NotePatch {
                body: Some("still only mine".to_string()),
                ..NotePatch::default()
            },
            UpdateMode::Patch,
        )
        .unwrap();
    assert_eq!(updated.body, "still only mine");
    notes.delete_note(&alice, created.id).unwrap();
}

#[test]
fn foreign_private_note_is_invisible() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");

    let secret = notes
        .create_note(&alice, draft("Secret", "only alice"))
        .unwrap();

    let err = notes.get_note(&bob, secret.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(id) if id == secret.id));

    let err = notes
        .update_note(
            &bob,
            secret.id,
            NotePatch {
                body: Some("bob was here".to_string()),
                ..NotePatch::default()
            },
            UpdateMode::Patch,
        )
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    let err = notes.delete_note(&bob, secret.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    let listed = notes.list_notes(&bob, &NoteFilter::any()).unwrap();
    assert!(listed.iter().all(|view| view.id != secret.id));

    let untouched = notes.get_note(&alice, secret.id).unwrap();
    assert_eq!(untouched.body, "only alice");
}

#[test]
fn public_note_is_readable_by_everyone() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");

    let shared = notes
        .create_note(
            &alice,
            NoteDraft {
                public: Some(true),
                ..draft("Announcement", "for everyone")
            },
        )
        .unwrap();

    assert!(notes.get_note(&bob, shared.id).is_ok());
    assert!(notes.get_note(&Identity::Anonymous, shared.id).is_ok());

    let anonymous_listing = notes
        .list_notes(&Identity::Anonymous, &NoteFilter::any())
        .unwrap();
    assert!(anonymous_listing.iter().any(|view| view.id == shared.id));
}

#[test]
fn public_note_is_not_writable_by_readers() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");

    let shared = notes
        .create_note(
            &alice,
            NoteDraft {
                public: Some(true),
                ..draft("Announcement", "for everyone")
            },
        )
        .unwrap();

    let patch = NotePatch {
        body: Some("defaced".to_string()),
        ..NotePatch::default()
    };
    let err = notes
        .update_note(&bob, shared.id, patch.clone(), UpdateMode::Patch)
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    let err = notes
        .update_note(&Identity::Anonymous, shared.id, patch, UpdateMode::Patch)
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    let err = notes.delete_note(&bob, shared.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));
    let err = notes.delete_note(&Identity::Anonymous, shared.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    let untouched = notes.get_note(&alice, shared.id).unwrap();
    assert_eq!(untouched.body, "for everyone");
}

#[test]
fn denied_access_reads_like_a_missing_note() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");

    let secret = notes
        .create_note(&alice, draft("Secret", "only alice"))
        .unwrap();

    let denied = notes.get_note(&bob, secret.id).unwrap_err();
    let missing_id = Uuid::new_v4();
    let missing = notes.get_note(&bob, missing_id).unwrap_err();

    // Same variant, same message shape: the id is the only difference.
    assert_eq!(
        denied.to_string(),
        format!("note not found: {}", secret.id)
    );
    assert_eq!(
        missing.to_string(),
        format!("note not found: {missing_id}")
    );
}

#[test]
fn owner_only_mode_hides_even_public_notes() {
    let conn = open_db_in_memory().unwrap();
    let notes = NoteService::with_mode(
        SqliteNoteRepository::try_new(&conn).unwrap(),
        SqliteTagRegistry::try_new(&conn).unwrap(),
        SharingMode::OwnerOnly,
    );
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");

    let flagged_public = notes
        .create_note(
            &alice,
            NoteDraft {
                public: Some(true),
                ..draft("Flagged", "public flag set")
            },
        )
        .unwrap();

    let err = notes.get_note(&bob, flagged_public.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));
    let err = notes
        .get_note(&Identity::Anonymous, flagged_public.id)
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));

    assert!(notes.list_notes(&bob, &NoteFilter::any()).unwrap().is_empty());
    assert!(notes
        .list_notes(&Identity::Anonymous, &NoteFilter::any())
        .unwrap()
        .is_empty());

    assert!(notes.get_note(&alice, flagged_public.id).is_ok());
    let own_listing = notes.list_notes(&alice, &NoteFilter::any()).unwrap();
    assert_eq!(own_listing.len(), 1);
}

fn note_service(conn: &Connection) -> NoteService<SqliteNoteRepository<'_>, SqliteTagRegistry<'_>> {
    NoteService::new(
        SqliteNoteRepository::try_new(conn).unwrap(),
        SqliteTagRegistry::try_new(conn).unwrap(),
    )
}

fn register(conn: &Connection, username: &str) -> Identity {
    let users = UserService::new(SqliteUserRepository::try_new(conn).unwrap());
    let view = users
        .register_user(
            &Identity::Anonymous,
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                credential: "argon2-hash".to_string(),
            },
        )
        .unwrap();
    Identity::User(view.id)
}

fn draft(title: &str, body: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        body: body.to_string(),
        ..NoteDraft::default()
    }
}
