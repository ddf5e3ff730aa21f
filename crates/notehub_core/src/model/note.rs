//! Note domain model.
//!
//! # Responsibility
//! - Define the stored note record and its inbound payload shapes.
//! - Normalize tag input and validate note fields before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another note.
//! - `author_uuid` is fixed at creation; payload author fields are ignored.
//! - Tag lists are kept sorted and free of duplicates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::model::user::UserId;

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Tag names are slugs: letters, digits, hyphen and underscore, at most 64
/// characters. Matching is exact, including case.
static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid tag name regex"));

/// Stored note record as read back from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub uuid: NoteId,
    pub title: String,
    pub body: String,
    pub author_uuid: UserId,
    pub is_public: bool,
    /// Sorted, duplicate-free tag names.
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Caller-facing projection of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub author: UserId,
    /// Sorted, duplicate-free tag names.
    pub tags: Vec<String>,
    pub public: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.uuid,
            title: note.title,
            body: note.body,
            author: note.author_uuid,
            tags: note.tags,
            public: note.is_public,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Tag names as they arrive on the wire: a single name or a list of names.
///
/// Both shapes collapse into the same normalized set, so `"work"` and
/// `["work"]` are equivalent payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    One(String),
    Many(Vec<String>),
}

impl TagsInput {
    fn names(&self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }
}

/// Collapses optional tag input into a sorted, duplicate-free name list.
///
/// Absent input yields the empty set. Names are kept verbatim; rejecting
/// malformed ones is validation's job.
pub fn normalize_tags(input: Option<&TagsInput>) -> Vec<String> {
    let Some(input) = input else {
        return Vec::new();
    };
    let unique: BTreeSet<String> = input.names().into_iter().collect();
    unique.into_iter().collect()
}

/// Payload for note creation.
///
/// `author` is accepted for wire compatibility and never read: authorship is
/// always taken from the acting identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub author: Option<UserId>,
}

/// Payload for note updates; field absence is meaningful, see [`UpdateMode`].
///
/// As with [`NoteDraft`], `author` is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub author: Option<UserId>,
}

/// How absent fields in a [`NotePatch`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Absent fields keep their stored values.
    Patch,
    /// The payload is the full new state: title and body are required,
    /// absent `public` resets to `false`, absent `tags` clears the set.
    Replace,
}

/// Write model for note insertion. Tags must already be normalized and
/// resolved through the tag registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub uuid: NoteId,
    pub title: String,
    pub body: String,
    pub author_uuid: UserId,
    pub is_public: bool,
    pub tags: Vec<String>,
}

impl NewNote {
    /// Creates a private, untagged note with a generated stable ID.
    pub fn new(author_uuid: UserId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            author_uuid,
            is_public: false,
            tags: Vec::new(),
        }
    }
}

/// Write model for note updates: the full effective state after merging.
///
/// `tags: None` keeps the existing links untouched; `Some` replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChange {
    pub title: String,
    pub body: String,
    pub is_public: bool,
    pub tags: Option<Vec<String>>,
}

impl NoteChange {
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_note_fields(&self.title, &self.body, self.tags.as_deref().unwrap_or(&[]))
    }
}

/// Checks title, body and tag names without touching storage.
///
/// Whitespace is preserved in stored values; all-whitespace title or body is
/// rejected.
pub fn validate_note_fields(
    title: &str,
    body: &str,
    tags: &[String],
) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::TitleMissing);
    }
    let title_length = title.chars().count();
    if title_length > TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong {
            length: title_length,
        });
    }
    if body.trim().is_empty() {
        return Err(NoteValidationError::BodyMissing);
    }
    for tag in tags {
        if !TAG_NAME_RE.is_match(tag) {
            return Err(NoteValidationError::InvalidTag(tag.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    TitleMissing,
    TitleTooLong { length: usize },
    BodyMissing,
    InvalidTag(String),
}

impl std::fmt::Display for NoteValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleMissing => write!(f, "title is required"),
            Self::TitleTooLong { length } => {
                write!(f, "title is {length} characters, limit is {TITLE_MAX_CHARS}")
            }
            Self::BodyMissing => write!(f, "body is required"),
            Self::InvalidTag(tag) => write!(f, "tag name is not a valid slug: {tag:?}"),
        }
    }
}

impl std::error::Error for NoteValidationError {}
