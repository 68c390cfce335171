//! Types stored in a visitor's session.

use serde::{Deserialize, Serialize};

use lustre_core::{Role, UserId};

use super::user::UserRecord;

/// Session-stored principal of a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&UserRecord> for CurrentUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Ordered item ids in the cart.
    pub const CART: &str = "cart";

    /// Ordered item ids marked as favorite.
    pub const FAVORITES: &str = "favorites";

    /// The logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Queued one-shot notices.
    pub const FLASH: &str = "flash";
}
