//! User repository for back-office accounts.

use sqlx::SqlitePool;

use lustre_core::{Role, UserId};

use super::RepositoryError;
use crate::models::user::UserRecord;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by exact (case-sensitive) username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserRecord, RepositoryError> {
        let id: UserId = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("username '{username}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        Ok(UserRecord {
            id,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            role,
        })
    }

    /// Replace a user's password hash.
    ///
    /// Returns `false` if no user has this username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
