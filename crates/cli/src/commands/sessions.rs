//! Session maintenance commands.

use sqlx::SqlitePool;

use lustre_storefront::db::SessionRepository;

use super::CommandError;

/// Delete expired sessions.
pub async fn prune(pool: &SqlitePool) -> Result<(), CommandError> {
    SessionRepository::new(pool.clone()).prune_expired().await?;
    tracing::info!("Expired sessions pruned");
    Ok(())
}
