//! Account-level access policy.
//!
//! # Responsibility
//! - Decide who may register, read, modify and delete accounts.
//! - Decide which account fields an actor may see.
//!
//! # Invariants
//! - Accounts are modified by their owner only; there is no admin bypass.
//! - Registration is open to anonymous actors only.

use crate::model::identity::Identity;
use crate::model::user::UserId;

/// Account reads are open to every actor; field redaction is handled
/// separately by [`can_view_email`].
pub fn can_view_user(_actor: &Identity) -> bool {
    true
}

/// Only anonymous actors may register: an authenticated session already has
/// an account and cannot mint new ones.
pub fn can_register(actor: &Identity) -> bool {
    actor.is_anonymous()
}

/// Update and delete are owner-only.
pub fn can_modify_user(actor: &Identity, target: UserId) -> bool {
    actor.is_user(target)
}

/// The email address is visible to the account owner alone.
pub fn can_view_email(actor: &Identity, target: UserId) -> bool {
    actor.is_user(target)
}
