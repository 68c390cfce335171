//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::LustreConfig;
use crate::db::SessionRepository;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LustreConfig,
    pool: SqlitePool,
    sessions: SessionRepository,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The session store shares `pool`, so both must point at the same
    /// migrated database.
    #[must_use]
    pub fn new(config: LustreConfig, pool: SqlitePool) -> Self {
        let sessions = SessionRepository::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sessions,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &LustreConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the session repository.
    #[must_use]
    pub fn sessions(&self) -> &SessionRepository {
        &self.inner.sessions
    }
}
