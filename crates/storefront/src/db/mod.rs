//! Database operations for the storefront `SQLite` file.
//!
//! ## Tables
//!
//! - `jewelry` - Catalog items
//! - `users` - Back-office users (argon2 password hashes)
//! - `tower_sessions` - Visitor sessions, owned by the session store (see
//!   [`sessions::SessionRepository`])
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded at
//! compile time, and applied on start-up or via:
//! ```bash
//! cargo run -p lustre-cli -- migrate
//! ```

pub mod catalog;
pub mod sessions;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tower_sessions_sqlx_store::SqliteStore;

pub use catalog::CatalogRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying embedded migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The session store failed.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session_store::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool, creating the database file if missing.
///
/// # Arguments
///
/// * `database_url` - `SQLite` URL, e.g. `sqlite://lustre.db`
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the file cannot be opened.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply the embedded migrations and create the session table.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if a migration fails or the applied
/// history diverges from the embedded one, `RepositoryError::Database` if the
/// session table cannot be created.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    SqliteStore::new(pool.clone()).migrate().await?;
    Ok(())
}

/// Open a migrated, private in-memory database.
///
/// Every `SQLite` in-memory connection is its own database, so the pool is
/// pinned to a single connection that is never recycled.
///
/// # Errors
///
/// Returns `RepositoryError` if the connection or migrations fail.
pub async fn connect_in_memory() -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
