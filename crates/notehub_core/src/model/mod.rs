//! Domain model for accounts, notes and acting identities.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Validate inbound payloads before they reach persistence.
//!
//! # Invariants
//! - Every stored object is identified by a stable `Uuid`.
//! - Authorship of a note is fixed at creation and never changes.

pub mod identity;
pub mod note;
pub mod user;
