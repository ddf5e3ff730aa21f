//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate policy checks, validation and repository calls into
//!   use-case level APIs.
//! - Keep hosting layers decoupled from storage details.

pub mod note_service;
pub mod user_service;
