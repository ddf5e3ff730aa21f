//! Acting identity attached to every core operation.
//!
//! # Responsibility
//! - Represent who is performing a request: a verified user or nobody.
//!
//! # Invariants
//! - Credentials never appear here; verification happens in the hosting
//!   layer before an `Identity` is constructed.
//! - `Identity::User` always carries the id of an existing account.

use crate::model::user::UserId;

/// The actor behind a core operation.
///
/// The hosting layer authenticates the request and hands the core either a
/// verified user id or the anonymous sentinel. Policy decisions key off this
/// value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Request with no verified user behind it.
    Anonymous,
    /// Request made on behalf of a verified account.
    User(UserId),
}

impl Identity {
    /// Returns the acting user id, or `None` for anonymous requests.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns whether this identity is exactly the given user.
    pub fn is_user(&self, id: UserId) -> bool {
        matches!(self, Self::User(current) if *current == id)
    }
}
