//! Object-level note access policy.
//!
//! # Responsibility
//! - Answer whether an actor may read, write or delete a given note.
//!
//! # Invariants
//! - Authors keep full control of their own notes in every sharing mode.
//! - The public flag can grant read access at most; it never grants writes.
//! - Unknown combinations fall through to denial.

use crate::model::identity::Identity;
use crate::model::note::Note;

/// Operation classes for note access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOperation {
    Read,
    Write,
    Delete,
}

impl NoteOperation {
    /// Only read-class operations can ever be granted by the public flag.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Read)
    }
}

/// How far a note travels beyond its author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SharingMode {
    /// Authors have full control; notes flagged public are readable by
    /// everyone, including anonymous actors.
    #[default]
    PublicRead,
    /// Authors have full control; nobody else sees anything. The public
    /// flag is stored but grants nothing.
    OwnerOnly,
}

/// Decides whether `actor` may perform `operation` on `note`.
///
/// Returns plain `bool`; translating denial into "not found" versus
/// "permission denied" is the caller's concern.
pub fn can_access(
    mode: SharingMode,
    actor: &Identity,
    note: &Note,
    operation: NoteOperation,
) -> bool {
    if actor.is_user(note.author_uuid) {
        return true;
    }
    match mode {
        SharingMode::PublicRead => operation.is_read_only() && note.is_public,
        SharingMode::OwnerOnly => false,
    }
}
