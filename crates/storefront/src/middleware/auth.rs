//! Back-office access guard.
//!
//! [`authorize_admin`] is the whole policy; [`RequireAdmin`] applies it as an
//! extractor so a refused request never reaches the handler body.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use super::visitor::Visitor;
use crate::models::{CurrentUser, FlashLevel};

/// Why a request was refused by the admin guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardDenial {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("admin role required")]
    NotAdmin,
}

/// Admit only a logged-in principal with the admin role.
///
/// # Errors
///
/// Returns `GuardDenial::NotLoggedIn` for an anonymous visitor and
/// `GuardDenial::NotAdmin` for any other role.
pub fn authorize_admin(principal: Option<&CurrentUser>) -> Result<&CurrentUser, GuardDenial> {
    let user = principal.ok_or(GuardDenial::NotLoggedIn)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(GuardDenial::NotAdmin)
    }
}

/// Extractor that requires an admin.
///
/// On denial it queues "Admin access required" and redirects to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for [`RequireAdmin`].
#[derive(Debug)]
pub enum AdminRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing or the session could not be read.
    SessionUnavailable,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::SessionUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Flash shown when the guard refuses a request.
pub const ACCESS_REQUIRED_MESSAGE: &str = "Admin access required";

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state)
            .await
            .map_err(|_| AdminRejection::SessionUnavailable)?;

        let principal = visitor.current_user().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read session principal");
            AdminRejection::SessionUnavailable
        })?;

        match authorize_admin(principal.as_ref()) {
            Ok(admin) => Ok(Self(admin.clone())),
            Err(denial) => {
                tracing::info!(path = %parts.uri.path(), reason = %denial, "Admin access denied");
                visitor
                    .flash(FlashLevel::Danger, ACCESS_REQUIRED_MESSAGE)
                    .await
                    .map_err(|_| AdminRejection::SessionUnavailable)?;
                Err(AdminRejection::RedirectToLogin)
            }
        }
    }
}
