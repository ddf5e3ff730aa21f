//! Account domain model.
//!
//! # Responsibility
//! - Define the stored account record and its inbound payload shapes.
//! - Validate usernames, emails and credentials before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another account.
//! - The credential is write-only: it is stored on registration or update
//!   and never read back out of this crate.
//! - `username` is unique across the store; uniqueness is enforced by the
//!   storage layer, not here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an account.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UserId = Uuid;

/// Maximum username length in characters.
pub const USERNAME_MAX_CHARS: usize = 150;

/// Maximum email length in characters.
pub const EMAIL_MAX_CHARS: usize = 254;

/// Word characters plus `.@+-`, the classic account-name alphabet.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Shape check only; full address verification is a hosting-layer concern.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Stored account record as read back from persistence.
///
/// The credential column is deliberately absent: nothing in this crate ever
/// selects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uuid: UserId,
    pub username: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Projects this record into the caller-facing view.
    ///
    /// The email is only carried across when `include_email` is set; owners
    /// see their own address, everyone else gets a redacted view.
    pub fn to_view(&self, include_email: bool) -> UserView {
        UserView {
            id: self.uuid,
            username: self.username.clone(),
            email: include_email.then(|| self.email.clone()),
            created_at: self.created_at,
        }
    }
}

/// Caller-facing projection of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    /// Present only when the acting identity owns this account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Registration payload.
///
/// The credential arrives opaque (already hashed by the hosting layer); the
/// core only checks that one was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub credential: String,
}

impl NewUser {
    /// Validates the payload without touching storage.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        if self.credential.trim().is_empty() {
            return Err(UserValidationError::CredentialMissing);
        }
        Ok(())
    }
}

/// Partial account update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub credential: Option<String>,
}

impl UserPatch {
    /// Validates every supplied field; absent fields are not checked.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(credential) = &self.credential {
            if credential.trim().is_empty() {
                return Err(UserValidationError::CredentialMissing);
            }
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::UsernameMissing);
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(UserValidationError::UsernameTooLong {
            length: username.chars().count(),
        });
    }
    if !USERNAME_RE.is_match(username) {
        return Err(UserValidationError::UsernameInvalid(username.to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmailMissing);
    }
    if email.chars().count() > EMAIL_MAX_CHARS || !EMAIL_RE.is_match(email) {
        return Err(UserValidationError::EmailInvalid(email.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    UsernameMissing,
    UsernameTooLong { length: usize },
    UsernameInvalid(String),
    EmailMissing,
    EmailInvalid(String),
    CredentialMissing,
}

impl std::fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameMissing => write!(f, "username is required"),
            Self::UsernameTooLong { length } => write!(
                f,
                "username is {length} characters, limit is {USERNAME_MAX_CHARS}"
            ),
            Self::UsernameInvalid(username) => {
                write!(f, "username contains unsupported characters: {username}")
            }
            Self::EmailMissing => write!(f, "email is required"),
            Self::EmailInvalid(email) => write!(f, "email is not a valid address: {email}"),
            Self::CredentialMissing => write!(f, "credential is required"),
        }
    }
}

impl std::error::Error for UserValidationError {}
