//! Per-request visitor context.
//!
//! [`Visitor`] wraps the `tower-sessions` [`Session`] of the current request
//! and owns every read and write of session keys: cart, favorites, the
//! logged-in user and flash messages. Writes go through `Session::insert` or
//! `Session::remove`, which mark the session modified so the session layer
//! saves it when the response is sent.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use lustre_core::{ItemId, Selection, Toggle};

use crate::models::session::keys;
use crate::models::{CurrentUser, Flash, FlashLevel};

/// The session-scoped state of whoever sent the request.
#[derive(Debug, Clone)]
pub struct Visitor {
    session: Session,
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session))
    }
}

impl Visitor {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    async fn selection(&self, key: &str) -> Result<Selection, SessionError> {
        Ok(self.session.get::<Selection>(key).await?.unwrap_or_default())
    }

    async fn store_selection(&self, key: &str, selection: &Selection) -> Result<(), SessionError> {
        self.session.insert(key, selection).await
    }

    // =========================================================================
    // Cart & favorites
    // =========================================================================

    /// Item ids in the cart, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or decoded.
    pub async fn cart(&self) -> Result<Selection, SessionError> {
        self.selection(keys::CART).await
    }

    /// Favorite item ids, in the order they were marked.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or decoded.
    pub async fn favorites(&self) -> Result<Selection, SessionError> {
        self.selection(keys::FAVORITES).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or decoded.
    pub async fn cart_count(&self) -> Result<usize, SessionError> {
        Ok(self.cart().await?.len())
    }

    /// Add an item to the cart. Returns `false` if it was already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn add_to_cart(&self, id: ItemId) -> Result<bool, SessionError> {
        let mut cart = self.cart().await?;
        let added = cart.add(id);
        if added {
            self.store_selection(keys::CART, &cart).await?;
        }
        Ok(added)
    }

    /// Remove an item from the cart. Returns `false` if it was not there.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn remove_from_cart(&self, id: ItemId) -> Result<bool, SessionError> {
        let mut cart = self.cart().await?;
        let removed = cart.remove(id);
        if removed {
            self.store_selection(keys::CART, &cart).await?;
        }
        Ok(removed)
    }

    /// Flip an item's favorite mark.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn toggle_favorite(&self, id: ItemId) -> Result<Toggle, SessionError> {
        let mut favorites = self.favorites().await?;
        let outcome = favorites.toggle(id);
        self.store_selection(keys::FAVORITES, &favorites).await?;
        Ok(outcome)
    }

    /// Drop a deleted item from this visitor's cart and favorites.
    ///
    /// The session store purges other sessions; this keeps the copy loaded
    /// for the current request from writing the id back.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn forget_item(&self, id: ItemId) -> Result<(), SessionError> {
        for key in [keys::CART, keys::FAVORITES] {
            let mut selection = self.selection(key).await?;
            if selection.remove(id) {
                self.store_selection(key, &selection).await?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Login state
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or decoded.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, SessionError> {
        self.session.get::<CurrentUser>(keys::CURRENT_USER).await
    }

    /// Record a successful login. The session id is rotated first so a
    /// pre-login cookie cannot be reused for the authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn log_in(&self, user: &CurrentUser) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.session.insert(keys::CURRENT_USER, user).await
    }

    /// Clear the logged-in user. Cart and favorites are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn log_out(&self) -> Result<(), SessionError> {
        self.session
            .remove::<CurrentUser>(keys::CURRENT_USER)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Flash messages
    // =========================================================================

    /// Queue a notice for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn flash(&self, level: FlashLevel, message: impl Into<String>) -> Result<(), SessionError> {
        let mut flashes = self
            .session
            .get::<Vec<Flash>>(keys::FLASH)
            .await?
            .unwrap_or_default();
        flashes.push(Flash::new(level, message));
        self.session.insert(keys::FLASH, flashes).await
    }

    /// Remove and return every queued notice, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded or modified.
    pub async fn take_flashes(&self) -> Result<Vec<Flash>, SessionError> {
        Ok(self
            .session
            .remove::<Vec<Flash>>(keys::FLASH)
            .await?
            .unwrap_or_default())
    }
}
