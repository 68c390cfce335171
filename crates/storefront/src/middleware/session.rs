//! Session middleware configuration.
//!
//! Sessions are kept in `SQLite` through [`SqliteStore`] and identified by a
//! signed cookie.

use secrecy::ExposeSecret;
use thiserror::Error;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::LustreConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lustre_session";

/// Inactivity period after which a session expires (7 days).
const SESSION_EXPIRY_DAYS: i64 = 7;

/// The configured session layer type.
pub type LustreSessionLayer = SessionManagerLayer<SqliteStore, SignedCookie>;

#[derive(Debug, Error)]
#[error("session secret cannot be used as a signing key: {0}")]
pub struct SessionKeyError(String);

/// Create the session layer with the `SQLite` store and a signed cookie.
///
/// # Errors
///
/// Returns `SessionKeyError` if the session secret is shorter than 64 bytes.
pub fn create_session_layer(
    store: SqliteStore,
    config: &LustreConfig,
) -> Result<LustreSessionLayer, SessionKeyError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|e| SessionKeyError(e.to_string()))?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(SESSION_EXPIRY_DAYS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
