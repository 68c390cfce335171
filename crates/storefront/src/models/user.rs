//! Back-office user rows.

use lustre_core::{Role, UserId};

/// A row of the `users` table.
///
/// Implements `Debug` manually so the password hash never reaches logs.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}
