//! Catalog repository for the `jewelry` table.
//!
//! Listing queries are assembled with [`QueryBuilder`]: the category is always
//! a bound parameter and the ORDER BY clause only ever comes from
//! [`order_by`], so no request input reaches the SQL text.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use lustre_core::{
    Carat, CatalogQuery, CategoryFilter, ItemFields, ItemId, JewelryItem, Price, SortOrder,
};

use super::RepositoryError;

/// Largest number of ids bound in one `IN (...)` list.
pub const IDS_PER_QUERY: usize = 500;

const SELECT_ITEMS: &str = "SELECT id, name, description, price_cents, carat_points, \
     category, image_url, is_featured FROM jewelry";

/// Row shape of the `jewelry` table.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    name: String,
    description: Option<String>,
    price_cents: i64,
    carat_points: Option<i64>,
    category: Option<String>,
    image_url: Option<String>,
    is_featured: bool,
}

impl From<ItemRow> for JewelryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            fields: ItemFields {
                name: row.name,
                description: row.description,
                price: Price::from_cents(row.price_cents),
                carat: row.carat_points.map(Carat::from_points),
                category: row.category,
                image_url: row.image_url,
                is_featured: row.is_featured,
            },
        }
    }
}

/// ORDER BY clause for a sort order. Items without a carat weight sort last
/// in both carat orders; ties fall back to insertion order.
const fn order_by(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::PriceAsc => "price_cents ASC, id ASC",
        SortOrder::PriceDesc => "price_cents DESC, id ASC",
        SortOrder::CaratAsc => "carat_points IS NULL, carat_points ASC, id ASC",
        SortOrder::CaratDesc => "carat_points IS NULL, carat_points DESC, id ASC",
    }
}

/// Repository for catalog item operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new item and return it with its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, fields: &ItemFields) -> Result<JewelryItem, RepositoryError> {
        let id: ItemId = sqlx::query_scalar(
            r"
            INSERT INTO jewelry
                (name, description, price_cents, carat_points, category, image_url, is_featured)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.cents())
        .bind(fields.carat.map(Carat::points))
        .bind(&fields.category)
        .bind(&fields.image_url)
        .bind(fields.is_featured)
        .fetch_one(self.pool)
        .await?;

        Ok(JewelryItem {
            id,
            fields: fields.clone(),
        })
    }

    /// Get an item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<JewelryItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("{SELECT_ITEMS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(JewelryItem::from))
    }

    /// List items matching a resolved catalog query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<JewelryItem>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ITEMS);

        if let CategoryFilter::Exact(category) = &query.category {
            builder.push(" WHERE category = ").push_bind(category.as_str());
        }
        builder.push(" ORDER BY ").push(order_by(query.sort));

        let rows = builder
            .build_query_as::<ItemRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(JewelryItem::from).collect())
    }

    /// List every item in insertion order (back office).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<JewelryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!("{SELECT_ITEMS} ORDER BY id"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(JewelryItem::from).collect())
    }

    /// Fetch the items for a list of ids, in the order given.
    ///
    /// Ids with no matching row are skipped. Ids are bound in batches of
    /// [`IDS_PER_QUERY`] to stay under `SQLite`'s bind parameter limit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<JewelryItem>, RepositoryError> {
        let mut by_id: HashMap<ItemId, JewelryItem> = HashMap::new();

        for batch in ids.chunks(IDS_PER_QUERY) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ITEMS);
            builder.push(" WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in batch {
                separated.push_bind(id.as_i64());
            }
            separated.push_unseparated(")");

            let rows = builder
                .build_query_as::<ItemRow>()
                .fetch_all(self.pool)
                .await?;
            by_id.extend(rows.into_iter().map(|row| (row.id, JewelryItem::from(row))));
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Replace every field of an item.
    ///
    /// Returns `false` if no item has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, id: ItemId, fields: &ItemFields) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE jewelry SET
                name = ?, description = ?, price_cents = ?, carat_points = ?,
                category = ?, image_url = ?, is_featured = ?
            WHERE id = ?
            ",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.cents())
        .bind(fields.carat.map(Carat::points))
        .bind(&fields.category)
        .bind(&fields.image_url)
        .bind(fields.is_featured)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an item.
    ///
    /// Returns whether a row existed. Pruning the id from visitor sessions is
    /// the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM jewelry WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Distinct non-null categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM jewelry WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Number of items in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jewelry")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn price(raw: &str) -> Price {
        raw.parse().unwrap()
    }

    fn carat(raw: &str) -> Carat {
        raw.parse().unwrap()
    }

    async fn seeded(pool: &SqlitePool) -> Vec<JewelryItem> {
        let repo = CatalogRepository::new(pool);
        let fixtures = [
            ItemFields::new("Ring A", price("100")).with_category("rings").with_carat(carat("1.0")),
            ItemFields::new("Ring B", price("50")).with_category("rings").with_carat(carat("0.5")),
            ItemFields::new("Pendant", price("75")).with_category("necklaces"),
            ItemFields::new("Studs", price("300")).with_category("earrings").with_carat(carat("2")),
        ];
        let mut items = Vec::new();
        for fields in &fixtures {
            items.push(repo.create(fields).await.unwrap());
        }
        items
    }

    fn names(items: &[JewelryItem]) -> Vec<&str> {
        items.iter().map(|i| i.fields.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_get_roundtrip() {
        let pool = connect_in_memory().await.unwrap();
        let repo = CatalogRepository::new(&pool);
        let fields = ItemFields::new("Emerald Ring", price("1299.99"))
            .with_description("Colombian emerald")
            .with_carat(carat("1.25"))
            .with_category("rings")
            .with_image_url("/static/images/emerald.png")
            .featured();

        let created = repo.create(&fields).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.fields, fields);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let pool = connect_in_memory().await.unwrap();
        let repo = CatalogRepository::new(&pool);
        assert!(repo.get(ItemId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_category_sorted_by_price() {
        let pool = connect_in_memory().await.unwrap();
        seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let query = CatalogQuery::new(
            CategoryFilter::Exact("rings".to_owned()),
            SortOrder::PriceAsc,
        );
        let items = repo.list(&query).await.unwrap();

        assert_eq!(names(&items), ["Ring B", "Ring A"]);
    }

    #[tokio::test]
    async fn test_list_all_returns_every_item() {
        let pool = connect_in_memory().await.unwrap();
        let seeded = seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let items = repo.list(&CatalogQuery::default()).await.unwrap();
        assert_eq!(items.len(), seeded.len());

        for category in repo.distinct_categories().await.unwrap() {
            let query = CatalogQuery::new(CategoryFilter::Exact(category.clone()), SortOrder::PriceDesc);
            let filtered = repo.list(&query).await.unwrap();
            assert!(!filtered.is_empty());
            assert!(
                filtered
                    .iter()
                    .all(|i| i.fields.category.as_deref() == Some(category.as_str()))
            );
        }
    }

    #[tokio::test]
    async fn test_price_orders_are_monotonic() {
        let pool = connect_in_memory().await.unwrap();
        seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let asc = repo
            .list(&CatalogQuery::new(CategoryFilter::All, SortOrder::PriceAsc))
            .await
            .unwrap();
        assert!(asc.windows(2).all(|w| w[0].fields.price <= w[1].fields.price));

        let desc = repo
            .list(&CatalogQuery::new(CategoryFilter::All, SortOrder::PriceDesc))
            .await
            .unwrap();
        assert!(desc.windows(2).all(|w| w[0].fields.price >= w[1].fields.price));
    }

    #[tokio::test]
    async fn test_carat_orders_put_missing_weights_last() {
        let pool = connect_in_memory().await.unwrap();
        seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let asc = repo
            .list(&CatalogQuery::new(CategoryFilter::All, SortOrder::CaratAsc))
            .await
            .unwrap();
        assert_eq!(names(&asc), ["Ring B", "Ring A", "Studs", "Pendant"]);

        let desc = repo
            .list(&CatalogQuery::new(CategoryFilter::All, SortOrder::CaratDesc))
            .await
            .unwrap();
        assert_eq!(names(&desc), ["Studs", "Ring A", "Ring B", "Pendant"]);
    }

    #[tokio::test]
    async fn test_category_filter_is_bound_not_interpolated() {
        let pool = connect_in_memory().await.unwrap();
        seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let query = CatalogQuery::new(
            CategoryFilter::Exact("rings' OR '1'='1".to_owned()),
            SortOrder::PriceAsc,
        );
        assert!(repo.list(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_keeps_requested_order_and_skips_unknown() {
        let pool = connect_in_memory().await.unwrap();
        let items = seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let ids = [items[2].id, ItemId::new(999), items[0].id];
        let fetched = repo.get_many(&ids).await.unwrap();
        assert_eq!(names(&fetched), ["Pendant", "Ring A"]);

        assert!(repo.get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_spans_batches() {
        let pool = connect_in_memory().await.unwrap();
        let items = seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        // Far more ids than SQLite accepts as bind parameters in one statement.
        let mut ids: Vec<ItemId> = (10_000..50_000).map(ItemId::new).collect();
        ids.insert(IDS_PER_QUERY - 1, items[1].id);
        ids.insert(IDS_PER_QUERY, items[3].id);
        ids.push(items[0].id);

        let fetched = repo.get_many(&ids).await.unwrap();
        assert_eq!(names(&fetched), ["Ring B", "Studs", "Ring A"]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let pool = connect_in_memory().await.unwrap();
        let items = seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        let replacement = ItemFields::new("Ring A (resized)", price("120"));
        assert!(repo.update(items[0].id, &replacement).await.unwrap());

        let fetched = repo.get(items[0].id).await.unwrap().unwrap();
        assert_eq!(fetched.fields, replacement);
        assert_eq!(fetched.fields.category, None);

        assert!(!repo.update(ItemId::new(999), &replacement).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let pool = connect_in_memory().await.unwrap();
        let items = seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);

        assert!(repo.delete(items[1].id).await.unwrap());
        assert!(!repo.delete(items[1].id).await.unwrap());

        let remaining = repo.list(&CatalogQuery::default()).await.unwrap();
        assert!(remaining.iter().all(|i| i.id != items[1].id));
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_distinct_categories() {
        let pool = connect_in_memory().await.unwrap();
        seeded(&pool).await;
        let repo = CatalogRepository::new(&pool);
        repo.create(&ItemFields::new("Loose Stone", price("10")))
            .await
            .unwrap();

        assert_eq!(
            repo.distinct_categories().await.unwrap(),
            ["earrings", "necklaces", "rings"]
        );
    }
}
