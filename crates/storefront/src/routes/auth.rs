//! Login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::Visitor;
use crate::models::{CurrentUser, FlashLevel};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;
use crate::views::PageContext;

/// Login form data. Missing fields are empty and fail as bad credentials.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Display the login page.
pub async fn login_page(visitor: Visitor) -> Result<impl IntoResponse> {
    Ok(LoginTemplate {
        page: PageContext::load(&visitor).await?,
    })
}

/// Handle login form submission.
#[instrument(skip(state, visitor, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            visitor.log_in(&CurrentUser::from(&user)).await?;
            set_sentry_user(&user.id, &user.username);
            tracing::info!(role = %user.role, "Logged in");

            visitor.flash(FlashLevel::Success, "Logged in successfully").await?;
            Ok(Redirect::to("/admin"))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed");
            visitor
                .flash(FlashLevel::Danger, "Invalid username or password")
                .await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out. Cart and favorites stay with the session.
#[instrument(skip(visitor))]
pub async fn logout(visitor: Visitor) -> Result<Redirect> {
    visitor.log_out().await?;
    clear_sentry_user();

    visitor.flash(FlashLevel::Success, "Logged out successfully").await?;
    Ok(Redirect::to("/"))
}
