//! Visitor session maintenance.
//!
//! Records are persisted by [`SqliteStore`] in its own `tower_sessions`
//! table next to the catalog. This repository adds the cross-session work the
//! storefront needs on top of it: sweeping expired records and dropping a
//! deleted item from every visitor's cart and favorites.

use std::collections::HashMap;

use sqlx::SqlitePool;
use tower_sessions::session::Id;
use tower_sessions::session_store::{ExpiredDeletion, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use lustre_core::{ItemId, Selection};

use super::RepositoryError;
use crate::models::session::keys;

type SessionData = HashMap<String, serde_json::Value>;

/// Session records as seen by the back office.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
    store: SqliteStore,
}

impl SessionRepository {
    /// Create a repository over an already-migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let store = SqliteStore::new(pool.clone());
        Self { pool, store }
    }

    /// The session store backing the session layer.
    #[must_use]
    pub const fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Delete every expired session record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Session` if the store fails.
    pub async fn prune_expired(&self) -> Result<(), RepositoryError> {
        self.store.delete_expired().await?;
        Ok(())
    }

    /// Remove an item id from the cart and favorites of every live session.
    ///
    /// Returns the number of sessions that changed. Ids that do not parse are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if listing, loading or saving sessions fails.
    pub async fn purge_item(&self, id: ItemId) -> Result<u64, RepositoryError> {
        let session_ids = sqlx::query_scalar::<_, String>("SELECT id FROM tower_sessions")
            .fetch_all(&self.pool)
            .await?;

        let mut changed = 0;
        for raw in session_ids {
            let session_id = match raw.parse::<Id>() {
                Ok(session_id) => session_id,
                Err(e) => {
                    tracing::warn!(session_id = %raw, error = %e, "Skipping unreadable session id");
                    continue;
                }
            };

            // Expired records are not loaded.
            let Some(mut record) = self.store.load(&session_id).await? else {
                continue;
            };

            if !remove_from_selections(&mut record.data, id)? {
                continue;
            }

            self.store.save(&record).await?;
            changed += 1;
        }

        Ok(changed)
    }
}

/// Drop `id` from the cart and favorites entries of one session's data.
fn remove_from_selections(data: &mut SessionData, id: ItemId) -> Result<bool, RepositoryError> {
    let mut changed = false;

    for key in [keys::CART, keys::FAVORITES] {
        let Some(value) = data.get_mut(key) else {
            continue;
        };
        let Ok(mut selection) = serde_json::from_value::<Selection>(value.clone()) else {
            continue;
        };
        if selection.remove(id) {
            *value = serde_json::to_value(selection)
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            changed = true;
        }
    }

    Ok(changed)
}
