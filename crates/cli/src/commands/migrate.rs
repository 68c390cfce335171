//! Database migration command.
//!
//! Migrations are embedded from `crates/storefront/migrations/`; the web
//! server applies the same set on start-up.

use sqlx::SqlitePool;

use lustre_storefront::db;

use super::CommandError;

/// Apply all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<(), CommandError> {
    tracing::info!("Running migrations...");
    db::run_migrations(pool).await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
