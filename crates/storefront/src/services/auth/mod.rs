//! Authentication service.
//!
//! Username and password login against argon2 hashes, plus the account
//! management used by the CLI and the start-up admin seed.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;

use lustre_core::Role;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::UserRecord;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Username of the account created from `LUSTRE_ADMIN_PASSWORD`.
pub const SEED_ADMIN_USERNAME: &str = "admin";

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Create a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserRecord, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(username, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserNotFound` if no user has this username.
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        if self.users.set_password_hash(username, &password_hash).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Create the `admin` account unless it already exists.
    ///
    /// Returns whether a user was created. An existing account keeps its
    /// password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the configured password is too short.
    pub async fn seed_admin(&self, password: &SecretString) -> Result<bool, AuthError> {
        if self
            .users
            .find_by_username(SEED_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        match self
            .create_user(SEED_ADMIN_USERNAME, password.expose_secret(), Role::Admin)
            .await
        {
            Ok(_) => Ok(true),
            // Another process seeded it between the lookup and the insert.
            Err(AuthError::UserAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
