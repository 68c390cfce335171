//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog listing (?category=&sort=)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Cart & favorites (redirect back to the referring page)
//! GET  /add_to_cart/{id}
//! GET  /remove_from_cart/{id}
//! GET  /toggle_favorite/{id}
//! GET  /cart                      - Cart items and total
//! GET  /favorites                 - Favorite items
//!
//! # Back office (admin only)
//! GET  /admin                     - All items
//! GET  /admin/add                 - New item form
//! POST /admin/add                 - Create item (multipart)
//! GET  /admin/edit/{id}           - Edit item form
//! POST /admin/edit/{id}           - Replace item (multipart)
//! GET  /admin/delete/{id}         - Delete item
//!
//! # Auth
//! GET  /login                     - Login page
//! POST /login                     - Login action
//! GET  /logout                    - Logout action
//!
//! GET  /static/*                  - Static files and uploaded images
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod favorites;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::session::LustreSessionLayer;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Largest accepted admin form body (uploads included).
pub const MAX_FORM_BYTES: usize = 16 * 1024 * 1024;

/// Create the back-office routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/add", get(admin::new_item).post(admin::create_item))
        .route("/edit/{id}", get(admin::edit_item).post(admin::update_item))
        .route("/delete/{id}", get(admin::delete_item))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/add_to_cart/{id}", get(cart::add))
        .route("/remove_from_cart/{id}", get(cart::remove))
        .route("/cart", get(cart::show))
        .route("/toggle_favorite/{id}", get(favorites::toggle))
        .route("/favorites", get(favorites::show))
        .nest("/admin", admin_routes())
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Assemble the full application: pages, health checks, static files and
/// the middleware stack (Sentry layers excluded, see `main`).
pub fn app(state: AppState, session_layer: LustreSessionLayer) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            },
        ))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
