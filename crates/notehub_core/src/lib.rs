//! Core domain logic for NoteHub: multi-tenant notes with ownership-aware
//! visibility, a shared tag registry and composable listing filters.
//! Every access decision and validation rule is made here, never in an
//! embedding application.

pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod query;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::Identity;
pub use model::note::{
    normalize_tags, Note, NoteDraft, NoteId, NotePatch, NoteValidationError, NoteView, TagsInput,
    UpdateMode, TITLE_MAX_CHARS,
};
pub use model::user::{
    NewUser, User, UserId, UserPatch, UserValidationError, UserView, USERNAME_MAX_CHARS,
};
pub use policy::ownership::{can_modify_user, can_register, can_view_email, can_view_user};
pub use policy::visibility::{can_access, NoteOperation, SharingMode};
pub use query::note_filter::{compose_note_predicate, NoteFilter, NotePredicate};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::tag_registry::{SqliteTagRegistry, Tag, TagRegistry};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::user_service::{UserService, UserServiceError};

/// Link check for the CLI smoke binary.
pub fn ping() -> &'static str {
    "pong"
}

/// Crate version as baked in at compile time.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
