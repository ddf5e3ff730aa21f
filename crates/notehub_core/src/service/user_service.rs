//! Use-case service for accounts.
//!
//! # Responsibility
//! - Orchestrate registration, account reads, self-service updates and
//!   account deletion around the ownership policy.
//!
//! # Invariants
//! - Registration is open to anonymous actors only.
//! - Account reads are open to every actor.
//! - Modifying a foreign account is reported as `NotFound`, the same as a
//!   missing one.
//! - Email addresses leave this service only in owner views.

use crate::model::identity::Identity;
use crate::model::user::{NewUser, User, UserId, UserPatch, UserValidationError, UserView};
use crate::policy::ownership::{can_modify_user, can_register, can_view_email};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error surface of the account service.
#[derive(Debug)]
pub enum UserServiceError {
    /// Target account does not exist, or the actor may not touch it.
    NotFound(UserId),
    /// Payload failed validation; nothing was persisted.
    Validation(UserValidationError),
    /// The operation is not available to this actor at all.
    PermissionDenied { operation: &'static str },
    /// Another account already holds the requested username.
    UsernameTaken(String),
    /// Failure from the repository layer.
    Repo(RepoError),
    /// A row written by this call could not be read back.
    InconsistentState(&'static str),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(user_id) => write!(f, "user not found: {user_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::PermissionDenied { operation } => {
                write!(f, "operation not permitted: {operation}")
            }
            Self::UsernameTaken(username) => {
                write!(f, "username is already taken: {username}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "account state out of sync: {details}")
            }
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(user_id) => Self::NotFound(user_id),
            RepoError::UsernameTaken(username) => Self::UsernameTaken(username),
            other => Self::Repo(other),
        }
    }
}

impl From<UserValidationError> for UserServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Account service facade over a repository implementation.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Wraps the given repository in the account service API.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account. Only anonymous actors may do this.
    ///
    /// Returns the owner view of the new account; the registering party is
    /// its owner by construction.
    pub fn register_user(
        &self,
        actor: &Identity,
        registration: NewUser,
    ) -> Result<UserView, UserServiceError> {
        if !can_register(actor) {
            return Err(UserServiceError::PermissionDenied {
                operation: "register_user",
            });
        }
        registration.validate()?;

        let user_id = self.repo.create_user(&registration)?;
        let stored = self.fetch_existing(user_id)?;
        Ok(stored.to_view(true))
    }

    /// Gets one account; the email is present only in the owner's own view.
    ///
    /// Reads are open to every actor, see [`crate::policy::ownership::can_view_user`].
    pub fn get_user(
        &self,
        actor: &Identity,
        user_id: UserId,
    ) -> Result<UserView, UserServiceError> {
        let Some(user) = self.repo.get_user(user_id)? else {
            return Err(UserServiceError::NotFound(user_id));
        };
        Ok(user.to_view(can_view_email(actor, user_id)))
    }

    /// Lists all accounts, newest first, redacting emails per record.
    pub fn list_users(&self, actor: &Identity) -> Result<Vec<UserView>, UserServiceError> {
        let users = self.repo.list_users()?;
        Ok(users
            .into_iter()
            .map(|user| {
                let include_email = can_view_email(actor, user.uuid);
                user.to_view(include_email)
            })
            .collect())
    }

    /// Updates the actor's own account with the supplied fields.
    pub fn update_user(
        &self,
        actor: &Identity,
        user_id: UserId,
        patch: &UserPatch,
    ) -> Result<UserView, UserServiceError> {
        self.fetch_owned(actor, user_id)?;
        patch.validate()?;

        self.repo.update_user(user_id, patch)?;
        let stored = self.fetch_existing(user_id)?;
        Ok(stored.to_view(true))
    }

    /// Deletes the actor's own account; owned notes go with it.
    pub fn delete_user(
        &self,
        actor: &Identity,
        user_id: UserId,
    ) -> Result<(), UserServiceError> {
        self.fetch_owned(actor, user_id)?;
        self.repo.delete_user(user_id)?;
        Ok(())
    }

    /// Loads an account the actor owns; anything else is `NotFound`.
    fn fetch_owned(&self, actor: &Identity, user_id: UserId) -> Result<User, UserServiceError> {
        let Some(user) = self.repo.get_user(user_id)? else {
            return Err(UserServiceError::NotFound(user_id));
        };
        if !can_modify_user(actor, user_id) {
            return Err(UserServiceError::NotFound(user_id));
        }
        Ok(user)
    }

    /// Loads an account that was just written; absence is an internal bug.
    fn fetch_existing(&self, user_id: UserId) -> Result<User, UserServiceError> {
        self.repo
            .get_user(user_id)?
            .ok_or(UserServiceError::InconsistentState(
                "account missing after write read-back",
            ))
    }
}
