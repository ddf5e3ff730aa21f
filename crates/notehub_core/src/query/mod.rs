//! Composition of actor-visible note queries.
//!
//! # Responsibility
//! - Turn sharing mode, acting identity and caller filters into one SQL
//!   predicate with positional binds.
//!
//! # Invariants
//! - The visibility clause is always present; filters only narrow it.
//! - Caller input reaches SQL through binds, never through string splicing.

pub mod note_filter;
