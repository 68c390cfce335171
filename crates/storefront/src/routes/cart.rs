//! Cart route handlers.
//!
//! The cart is an ordered list of item ids kept in the visitor's session.
//! Add and remove redirect back to the page the visitor came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use lustre_core::ItemId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::Visitor;
use crate::models::FlashLevel;
use crate::redirect::redirect_back;
use crate::services::catalog::CatalogService;
use crate::state::AppState;
use crate::views::{ItemView, PageContext};

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub items: Vec<ItemView>,
    pub total: String,
}

/// Add an item to the cart.
#[instrument(skip(state, visitor, headers))]
pub async fn add(
    State(state): State<AppState>,
    visitor: Visitor,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
) -> Result<Redirect> {
    if visitor.add_to_cart(id).await? {
        let item_id = id.to_string();
        add_breadcrumb("cart", "Added item to cart", Some(&[("item_id", item_id.as_str())]));
        visitor.flash(FlashLevel::Success, "Item added to cart").await?;
    } else {
        visitor.flash(FlashLevel::Info, "Item already in cart").await?;
    }

    Ok(redirect_back(&headers, &state.config().base_url))
}

/// Remove an item from the cart.
#[instrument(skip(state, visitor, headers))]
pub async fn remove(
    State(state): State<AppState>,
    visitor: Visitor,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
) -> Result<Redirect> {
    if visitor.remove_from_cart(id).await? {
        visitor.flash(FlashLevel::Success, "Item removed from cart").await?;
    }

    Ok(redirect_back(&headers, &state.config().base_url))
}

/// Display the cart with its total.
#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> Result<impl IntoResponse> {
    let cart = visitor.cart().await?;
    let favorites = visitor.favorites().await?;
    let summary = CatalogService::new(state.pool()).cart(&cart).await?;

    Ok(CartTemplate {
        page: PageContext::load(&visitor).await?,
        items: ItemView::list(&summary.items, &cart, &favorites),
        total: summary.total.to_string(),
    })
}
