//! Use-case service for notes.
//!
//! # Responsibility
//! - Orchestrate note create/get/list/update/delete around policy checks,
//!   payload validation, tag resolution and persistence.
//!
//! # Invariants
//! - Authorship comes from the acting identity; payload author fields are
//!   never read.
//! - Payload validation runs before tag resolution, so invalid requests
//!   do not create tag rows.
//! - Denied object access is reported as `NotFound`; the caller cannot
//!   distinguish a hidden note from a missing one.

use crate::model::identity::Identity;
use crate::model::note::{
    normalize_tags, validate_note_fields, NewNote, Note, NoteChange, NoteDraft, NoteId, NotePatch,
    NoteValidationError, NoteView, UpdateMode,
};
use crate::policy::visibility::{can_access, NoteOperation, SharingMode};
use crate::query::note_filter::{compose_note_predicate, NoteFilter};
use crate::repo::note_repo::NoteRepository;
use crate::repo::tag_registry::{Tag, TagRegistry};
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error surface of the note service.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist, or the actor may not touch it.
    NotFound(NoteId),
    /// Payload failed validation; nothing was persisted.
    Validation(NoteValidationError),
    /// The operation is not available to this actor at all.
    PermissionDenied { operation: &'static str },
    /// Failure from the repository layer.
    Repo(RepoError),
    /// A row written by this call could not be read back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(note_id) => write!(f, "note not found: {note_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::PermissionDenied { operation } => {
                write!(f, "operation not permitted: {operation}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "note state out of sync: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(note_id) => Self::NotFound(note_id),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note service facade over repository and tag registry implementations.
pub struct NoteService<R: NoteRepository, T: TagRegistry> {
    repo: R,
    registry: T,
    mode: SharingMode,
}

impl<R: NoteRepository, T: TagRegistry> NoteService<R, T> {
    /// Creates a service with the canonical sharing mode.
    pub fn new(repo: R, registry: T) -> Self {
        Self::with_mode(repo, registry, SharingMode::default())
    }

    /// Creates a service with an explicit sharing mode.
    pub fn with_mode(repo: R, registry: T, mode: SharingMode) -> Self {
        Self {
            repo,
            registry,
            mode,
        }
    }

    /// Creates one note owned by the acting user.
    ///
    /// Anonymous actors are rejected before anything is validated or
    /// resolved. `draft.author` is ignored.
    pub fn create_note(
        &self,
        actor: &Identity,
        draft: NoteDraft,
    ) -> Result<NoteView, NoteServiceError> {
        let Some(author_uuid) = actor.user_id() else {
            return Err(NoteServiceError::PermissionDenied {
                operation: "create_note",
            });
        };

        let tags = normalize_tags(draft.tags.as_ref());
        validate_note_fields(&draft.title, &draft.body, &tags)?;

        // Resolution may leave tag rows behind if the insert below fails;
        // running it only after validation keeps bad payloads side-effect
        // free.
        let resolved = self.registry.resolve_all(&tags)?;

        let mut note = NewNote::new(author_uuid, draft.title, draft.body);
        note.is_public = draft.public.unwrap_or(false);
        note.tags = resolved.into_iter().map(|tag| tag.name).collect();

        let note_id = self.repo.insert_note(&note)?;
        let stored = self
            .repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::InconsistentState(
                "note missing after create read-back",
            ))?;
        Ok(NoteView::from(stored))
    }

    /// Gets one note the actor is allowed to read.
    pub fn get_note(
        &self,
        actor: &Identity,
        note_id: NoteId,
    ) -> Result<NoteView, NoteServiceError> {
        let note = self.fetch_note_for(actor, note_id, NoteOperation::Read)?;
        Ok(NoteView::from(note))
    }

    /// Lists notes visible to the actor, narrowed by the filter.
    ///
    /// Order is stable: `created_at ASC, uuid ASC`.
    pub fn list_notes(
        &self,
        actor: &Identity,
        filter: &NoteFilter,
    ) -> Result<Vec<NoteView>, NoteServiceError> {
        let predicate = compose_note_predicate(self.mode, actor, filter);
        let notes = self.repo.list_notes(&predicate)?;
        Ok(notes.into_iter().map(NoteView::from).collect())
    }

    /// Updates one note the actor is allowed to write.
    ///
    /// `UpdateMode::Patch` keeps absent fields; `UpdateMode::Replace`
    /// treats the payload as the full new state. `patch.author` is ignored.
    pub fn update_note(
        &self,
        actor: &Identity,
        note_id: NoteId,
        patch: NotePatch,
        update: UpdateMode,
    ) -> Result<NoteView, NoteServiceError> {
        let existing = self.fetch_note_for(actor, note_id, NoteOperation::Write)?;

        let change = merge_patch(existing, patch, update)?;
        change.validate()?;
        if let Some(tags) = &change.tags {
            self.registry.resolve_all(tags)?;
        }

        self.repo.update_note(note_id, &change)?;
        let stored = self
            .repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::InconsistentState(
                "note missing after update read-back",
            ))?;
        Ok(NoteView::from(stored))
    }

    /// Deletes one note the actor is allowed to delete. Tag rows survive.
    pub fn delete_note(
        &self,
        actor: &Identity,
        note_id: NoteId,
    ) -> Result<(), NoteServiceError> {
        self.fetch_note_for(actor, note_id, NoteOperation::Delete)?;
        self.repo.delete_note(note_id)?;
        Ok(())
    }

    /// Lists all known tags sorted by name.
    pub fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.registry.list_tags()
    }

    /// Loads a note and applies the object-level policy for `operation`.
    ///
    /// Denied access maps to `NotFound` so probing actors learn nothing
    /// about foreign notes.
    fn fetch_note_for(
        &self,
        actor: &Identity,
        note_id: NoteId,
        operation: NoteOperation,
    ) -> Result<Note, NoteServiceError> {
        let Some(note) = self.repo.get_note(note_id)? else {
            return Err(NoteServiceError::NotFound(note_id));
        };
        if !can_access(self.mode, actor, &note, operation) {
            return Err(NoteServiceError::NotFound(note_id));
        }
        Ok(note)
    }
}

/// Computes the effective full state for an update.
fn merge_patch(
    existing: Note,
    patch: NotePatch,
    update: UpdateMode,
) -> Result<NoteChange, NoteServiceError> {
    let change = match update {
        UpdateMode::Patch => NoteChange {
            title: patch.title.unwrap_or(existing.title),
            body: patch.body.unwrap_or(existing.body),
            is_public: patch.public.unwrap_or(existing.is_public),
            tags: patch.tags.as_ref().map(|input| normalize_tags(Some(input))),
        },
        UpdateMode::Replace => NoteChange {
            title: patch
                .title
                .ok_or(NoteServiceError::Validation(NoteValidationError::TitleMissing))?,
            body: patch
                .body
                .ok_or(NoteServiceError::Validation(NoteValidationError::BodyMissing))?,
            is_public: patch.public.unwrap_or(false),
            tags: Some(normalize_tags(patch.tags.as_ref())),
        },
    };
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::TagsInput;
    use uuid::Uuid;

    fn existing_note() -> Note {
        Note {
            uuid: Uuid::new_v4(),
            title: "old title".to_string(),
            body: "old body".to_string(),
            author_uuid: Uuid::new_v4(),
            is_public: true,
            tags: vec!["kept".to_string()],
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn patch_merge_keeps_absent_fields() {
        let patch = NotePatch {
            body: Some("new body".to_string()),
            ..NotePatch::default()
        };
        let change = merge_patch(existing_note(), patch, UpdateMode::Patch).unwrap();

        assert_eq!(change.title, "old title");
        assert_eq!(change.body, "new body");
        assert!(change.is_public);
        assert_eq!(change.tags, None);
    }

    #[test]
    fn patch_merge_replaces_tags_only_when_supplied() {
        let patch = NotePatch {
            tags: Some(TagsInput::Many(vec!["b".to_string(), "a".to_string()])),
            ..NotePatch::default()
        };
        let change = merge_patch(existing_note(), patch, UpdateMode::Patch).unwrap();

        assert_eq!(change.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn replace_merge_requires_title_and_body() {
        let missing_title = NotePatch {
            body: Some("body".to_string()),
            ..NotePatch::default()
        };
        assert!(matches!(
            merge_patch(existing_note(), missing_title, UpdateMode::Replace),
            Err(NoteServiceError::Validation(
                NoteValidationError::TitleMissing
            ))
        ));

        let missing_body = NotePatch {
            title: Some("title".to_string()),
            ..NotePatch::default()
        };
        assert!(matches!(
            merge_patch(existing_note(), missing_body, UpdateMode::Replace),
            Err(NoteServiceError::Validation(NoteValidationError::BodyMissing))
        ));
    }

    #[test]
    fn replace_merge_resets_absent_optionals() {
        let patch = NotePatch {
            title: Some("new title".to_string()),
            body: Some("new body".to_string()),
            ..NotePatch::default()
        };
        let change = merge_patch(existing_note(), patch, UpdateMode::Replace).unwrap();

        assert!(!change.is_public);
        assert_eq!(change.tags, Some(Vec::new()));
    }
}
