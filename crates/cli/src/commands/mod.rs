//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod sessions;

use sqlx::SqlitePool;
use thiserror::Error;

use lustre_storefront::config::database_url_from_env;
use lustre_storefront::db::{self, RepositoryError};
use lustre_storefront::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Could not open the database.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// User management failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Open the configured database.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    let database_url = database_url_from_env();
    tracing::info!(database_url = %database_url, "Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
