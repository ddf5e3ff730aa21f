//! Note listing predicate composer.
//!
//! # Responsibility
//! - Build the WHERE clause for note listings: visibility scope first, then
//!   caller filters AND-ed onto it.
//!
//! # Invariants
//! - Every tag criterion must hold (conjunctive semantics).
//! - Tag names match exactly; unknown names simply match no rows and are
//!   never created here.
//! - Search tokens are escaped so `%`, `_` and `\` match literally.

use rusqlite::types::Value;

use crate::model::identity::Identity;
use crate::policy::visibility::SharingMode;

/// Declarative restrictions a caller may put on a note listing.
///
/// Absent fields mean "no restriction". Filters can only narrow the actor's
/// visibility scope, never widen it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Tag names the note must all carry, matched exactly.
    pub tags: Vec<String>,
    /// Keep only notes whose public flag equals this value.
    pub public: Option<bool>,
    /// Single token matched case-insensitively (ASCII) as a substring of
    /// title or body. Blank tokens are treated as absent.
    pub search: Option<String>,
}

impl NoteFilter {
    /// Filter that matches everything the actor can see.
    pub fn any() -> Self {
        Self::default()
    }
}

/// A composed WHERE clause body plus its positional binds.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePredicate {
    pub clause: String,
    pub binds: Vec<Value>,
}

/// Composes the full listing predicate for one request.
///
/// The visibility scope comes first and is non-optional; a filter can only
/// subtract from it. `OwnerOnly` mode with an anonymous actor yields a
/// predicate matching no rows at all.
pub fn compose_note_predicate(
    mode: SharingMode,
    actor: &Identity,
    filter: &NoteFilter,
) -> NotePredicate {
    let mut clause = String::new();
    let mut binds: Vec<Value> = Vec::new();

    match (mode, actor.user_id()) {
        (SharingMode::PublicRead, None) => {
            clause.push_str("notes.is_public = 1");
        }
        (SharingMode::PublicRead, Some(user)) => {
            clause.push_str("(notes.author_uuid = ? OR notes.is_public = 1)");
            binds.push(Value::Text(user.to_string()));
        }
        (SharingMode::OwnerOnly, None) => {
            clause.push_str("0 = 1");
        }
        (SharingMode::OwnerOnly, Some(user)) => {
            clause.push_str("notes.author_uuid = ?");
            binds.push(Value::Text(user.to_string()));
        }
    }

    for tag in &filter.tags {
        clause.push_str(
            " AND EXISTS (
                SELECT 1
                FROM note_tags
                WHERE note_tags.note_uuid = notes.uuid
                  AND note_tags.tag_name = ?
            )",
        );
        binds.push(Value::Text(tag.clone()));
    }

    if let Some(public) = filter.public {
        clause.push_str(" AND notes.is_public = ?");
        binds.push(Value::Integer(i64::from(public)));
    }

    if let Some(token) = filter.search.as_deref() {
        let token = token.trim();
        if !token.is_empty() {
            let pattern = like_pattern(token);
            clause.push_str(" AND (notes.title LIKE ? ESCAPE '\\' OR notes.body LIKE ? ESCAPE '\\')");
            binds.push(Value::Text(pattern.clone()));
            binds.push(Value::Text(pattern));
        }
    }

    NotePredicate { clause, binds }
}

/// Wraps a search token in `%...%`, escaping LIKE metacharacters so the
/// token matches as a literal substring.
fn like_pattern(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    for ch in token.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{escaped}%")
}
