//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `users` storage.
//! - Map the `users.username` unique constraint to a semantic error.
//!
//! # Invariants
//! - The credential column is written on insert/update and never selected.
//! - Deleting an account cascades to its notes via foreign keys.

use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::{ensure_schema_current, parse_uuid, require_table, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    email,
    created_at
FROM users";

/// Repository interface for account CRUD operations.
pub trait UserRepository {
    /// Inserts one account and returns its generated stable id.
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId>;
    /// Gets one account by id.
    fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>>;
    /// Lists all accounts, newest first.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Applies the supplied fields to an existing account.
    fn update_user(&self, user_id: UserId, patch: &UserPatch) -> RepoResult<()>;
    /// Deletes the account together with its notes.
    fn delete_user(&self, user_id: UserId) -> RepoResult<()>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Builds a repository after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        require_table(
            conn,
            "users",
            &["uuid", "username", "email", "credential", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId> {
        let uuid = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO users (uuid, username, email, credential)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                uuid.to_string(),
                user.username.as_str(),
                user.email.as_str(),
                user.credential.as_str(),
            ],
        );

        match inserted {
            Ok(_) => Ok(uuid),
            Err(err) if is_username_conflict(&err) => {
                Err(RepoError::UsernameTaken(user.username.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{USER_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"
            ))?;

        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn update_user(&self, user_id: UserId, patch: &UserPatch) -> RepoResult<()> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        if let Some(username) = &patch.username {
            assignments.push("username = ?");
            binds.push(Value::Text(username.clone()));
        }
        if let Some(email) = &patch.email {
            assignments.push("email = ?");
            binds.push(Value::Text(email.clone()));
        }
        if let Some(credential) = &patch.credential {
            assignments.push("credential = ?");
            binds.push(Value::Text(credential.clone()));
        }

        if assignments.is_empty() {
            // Empty patches still report whether the target exists.
            return match self.get_user(user_id)? {
                Some(_) => Ok(()),
                None => Err(RepoError::NotFound(user_id)),
            };
        }

        let sql = format!(
            "UPDATE users SET {} WHERE uuid = ?;",
            assignments.join(", ")
        );
        binds.push(Value::Text(user_id.to_string()));

        let changed = match self.conn.execute(&sql, params_from_iter(binds)) {
            Ok(changed) => changed,
            Err(err) if is_username_conflict(&err) => {
                return Err(RepoError::UsernameTaken(
                    patch.username.clone().unwrap_or_default(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if changed == 0 {
            return Err(RepoError::NotFound(user_id));
        }

        Ok(())
    }

    fn delete_user(&self, user_id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE uuid = ?1;", [user_id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(user_id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        username: row.get("username")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

fn is_username_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == rusqlite::ErrorCode::ConstraintViolation
                && message.contains("users.username")
        }
        _ => false,
    }
}
