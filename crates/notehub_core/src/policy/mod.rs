//! Pure authorization decisions.
//!
//! # Responsibility
//! - Decide note access per operation, actor and sharing mode.
//! - Decide account-level rights: registration, modification, field
//!   visibility.
//!
//! # Invariants
//! - Decisions are pure functions of their inputs; no storage access.
//! - Every combination not explicitly granted here is denied.

pub mod ownership;
pub mod visibility;
