//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use lustre_core::ItemId;

use crate::error::Result;
use crate::middleware::Visitor;
use crate::redirect::redirect_back;
use crate::services::catalog::CatalogService;
use crate::state::AppState;
use crate::views::{ItemView, PageContext};

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub page: PageContext,
    pub items: Vec<ItemView>,
}

/// Mark or unmark an item as favorite.
#[instrument(skip(state, visitor, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    visitor: Visitor,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
) -> Result<Redirect> {
    let outcome = visitor.toggle_favorite(id).await?;
    tracing::debug!(item_id = %id, ?outcome, "Toggled favorite");

    Ok(redirect_back(&headers, &state.config().base_url))
}

/// Display the favorite items.
#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> Result<impl IntoResponse> {
    let cart = visitor.cart().await?;
    let favorites = visitor.favorites().await?;
    let items = CatalogService::new(state.pool()).selected(&favorites).await?;

    Ok(FavoritesTemplate {
        page: PageContext::load(&visitor).await?,
        items: ItemView::list(&items, &cart, &favorites),
    })
}
