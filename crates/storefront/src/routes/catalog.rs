//! Catalog listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::Visitor;
use crate::services::catalog::CatalogService;
use crate::state::AppState;
use crate::views::{CategoryOption, ItemView, PageContext, SortOption};

/// Raw listing parameters; resolved by the catalog service.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub items: Vec<ItemView>,
    pub categories: Vec<CategoryOption>,
    pub sorts: Vec<SortOption>,
    pub current_category: String,
    pub current_sort: &'static str,
}

/// Display the catalog, filtered and sorted.
#[instrument(skip(state, visitor))]
pub async fn index(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(query): Query<BrowseQuery>,
) -> Result<impl IntoResponse> {
    let listing = CatalogService::new(state.pool())
        .browse(query.category.as_deref(), query.sort.as_deref())
        .await?;

    let cart = visitor.cart().await?;
    let favorites = visitor.favorites().await?;

    Ok(IndexTemplate {
        page: PageContext::load(&visitor).await?,
        items: ItemView::list(&listing.items, &cart, &favorites),
        categories: CategoryOption::list(&listing.categories, &listing.query.category),
        sorts: SortOption::list(listing.query.sort),
        current_category: listing.query.category.key().to_owned(),
        current_sort: listing.query.sort.key(),
    })
}
