//! Back-office user management commands.
//!
//! There is no sign-up page; accounts only come from here or from the
//! `LUSTRE_ADMIN_PASSWORD` seed on server start-up.

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;

use lustre_core::Role;
use lustre_storefront::db;
use lustre_storefront::services::auth::AuthService;

use super::CommandError;

/// Create a user with the given role.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    role: Role,
    password: &SecretString,
) -> Result<(), CommandError> {
    db::run_migrations(pool).await?;

    tracing::info!("Creating user: {} ({})", username, role);
    let user = AuthService::new(pool)
        .create_user(username, password.expose_secret(), role)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(())
}

/// Replace the password of an existing user.
pub async fn set_password(
    pool: &SqlitePool,
    username: &str,
    password: &SecretString,
) -> Result<(), CommandError> {
    db::run_migrations(pool).await?;

    AuthService::new(pool)
        .set_password(username, password.expose_secret())
        .await?;

    tracing::info!("Password updated for {}", username);
    Ok(())
}
