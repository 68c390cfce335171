//! Catalog query engine.
//!
//! Turns the untrusted `category` and `sort` query values of a listing request
//! into a [`CatalogQuery`] and runs it. Category values are only accepted when
//! they name a category currently present in the catalog.

use sqlx::SqlitePool;
use tracing::instrument;

use lustre_core::{CatalogQuery, JewelryItem, Price, Selection};

use crate::db::{CatalogRepository, RepositoryError};

/// One rendered catalog listing.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub query: CatalogQuery,
    pub categories: Vec<String>,
    pub items: Vec<JewelryItem>,
}

/// Items of a cart in session order, with their total.
#[derive(Debug, Clone)]
pub struct CartSummary {
    pub items: Vec<JewelryItem>,
    pub total: Price,
}

/// Catalog browsing operations.
pub struct CatalogService<'a> {
    items: CatalogRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            items: CatalogRepository::new(pool),
        }
    }

    /// Resolve raw listing parameters and fetch the matching items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn browse(
        &self,
        category: Option<&str>,
        sort: Option<&str>,
    ) -> Result<CatalogPage, RepositoryError> {
        let categories = self.items.distinct_categories().await?;
        let query = CatalogQuery::resolve(category, sort, &categories);
        let items = self.items.list(&query).await?;

        tracing::debug!(
            category = query.category.key(),
            sort = query.sort.key(),
            count = items.len(),
            "Catalog listing"
        );

        Ok(CatalogPage {
            query,
            categories,
            items,
        })
    }

    /// Items of a selection in selection order; ids no longer in the catalog
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn selected(&self, selection: &Selection) -> Result<Vec<JewelryItem>, RepositoryError> {
        self.items.get_many(selection.ids()).await
    }

    /// The cart's items and their summed price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart(&self, cart: &Selection) -> Result<CartSummary, RepositoryError> {
        let items = self.selected(cart).await?;
        let total = items.iter().map(|item| item.fields.price).sum();
        Ok(CartSummary { items, total })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use lustre_core::{CategoryFilter, ItemFields, ItemId, SortOrder};

    async fn seeded() -> (SqlitePool, Vec<JewelryItem>) {
        let pool = connect_in_memory().await.unwrap();
        let repo = CatalogRepository::new(&pool);
        let mut items = Vec::new();
        for fields in [
            ItemFields::new("Ring A", "100".parse().unwrap()).with_category("rings"),
            ItemFields::new("Ring B", "50".parse().unwrap()).with_category("rings"),
            ItemFields::new("Bangle", "20".parse().unwrap()).with_category("bracelets"),
        ] {
            items.push(repo.create(&fields).await.unwrap());
        }
        (pool, items)
    }

    fn names(items: &[JewelryItem]) -> Vec<&str> {
        items.iter().map(|i| i.fields.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_browse_known_category() {
        let (pool, _) = seeded().await;
        let page = CatalogService::new(&pool)
            .browse(Some("rings"), Some("price_asc"))
            .await
            .unwrap();

        assert_eq!(names(&page.items), ["Ring B", "Ring A"]);
        assert_eq!(page.query.category, CategoryFilter::Exact("rings".to_owned()));
        assert_eq!(page.categories, ["bracelets", "rings"]);
    }

    #[tokio::test]
    async fn test_browse_falls_back_on_unknown_values() {
        let (pool, _) = seeded().await;
        let page = CatalogService::new(&pool)
            .browse(Some("rings; DROP TABLE jewelry"), Some("name_asc"))
            .await
            .unwrap();

        assert_eq!(page.query, CatalogQuery::new(CategoryFilter::All, SortOrder::PriceAsc));
        assert_eq!(names(&page.items), ["Bangle", "Ring B", "Ring A"]);
    }

    #[tokio::test]
    async fn test_cart_total_and_order() {
        let (pool, items) = seeded().await;
        let service = CatalogService::new(&pool);

        let cart: Selection = [items[0].id, ItemId::new(404), items[2].id].into_iter().collect();
        let summary = service.cart(&cart).await.unwrap();

        assert_eq!(names(&summary.items), ["Ring A", "Bangle"]);
        assert_eq!(summary.total, Price::from_cents(12_000));
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let (pool, _) = seeded().await;
        let summary = CatalogService::new(&pool)
            .cart(&Selection::new())
            .await
            .unwrap();

        assert!(summary.items.is_empty());
        assert_eq!(summary.total, Price::ZERO);
    }
}
