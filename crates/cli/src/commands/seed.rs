//! Seed the catalog with demo jewelry.

use sqlx::SqlitePool;

use lustre_core::{Carat, ItemFields, Price};
use lustre_storefront::db::{self, CatalogRepository};

use super::CommandError;

fn demo_items() -> Vec<ItemFields> {
    vec![
        ItemFields::new("Classic Solitaire Ring", Price::from_cents(249_900))
            .with_description("Round brilliant diamond on a platinum band")
            .with_carat(Carat::from_points(100))
            .with_category("Rings")
            .featured(),
        ItemFields::new("Halo Engagement Ring", Price::from_cents(189_500))
            .with_description("Cushion cut center stone ringed with pavé diamonds")
            .with_carat(Carat::from_points(75))
            .with_category("Rings"),
        ItemFields::new("Pearl Drop Earrings", Price::from_cents(32_000))
            .with_description("Freshwater pearls on 14k gold hooks")
            .with_category("Earrings"),
        ItemFields::new("Diamond Stud Earrings", Price::from_cents(115_000))
            .with_description("Matched pair in four-prong settings")
            .with_carat(Carat::from_points(50))
            .with_category("Earrings")
            .featured(),
        ItemFields::new("Sapphire Pendant", Price::from_cents(68_000))
            .with_description("Oval blue sapphire on an 18 inch chain")
            .with_carat(Carat::from_points(120))
            .with_category("Necklaces"),
        ItemFields::new("Tennis Bracelet", Price::from_cents(410_000))
            .with_description("Line of round diamonds in white gold")
            .with_carat(Carat::from_points(300))
            .with_category("Bracelets"),
    ]
}

/// Insert the demo catalog, unless the catalog already has items.
pub async fn demo_catalog(pool: &SqlitePool) -> Result<(), CommandError> {
    db::run_migrations(pool).await?;

    let catalog = CatalogRepository::new(pool);
    let existing = catalog.count().await?;
    if existing > 0 {
        tracing::warn!(existing, "Catalog is not empty, skipping seed");
        return Ok(());
    }

    let items = demo_items();
    for fields in &items {
        let item = catalog.create(fields).await?;
        tracing::info!("  {} - {} ({})", item.id, item.fields.name, item.fields.price);
    }

    tracing::info!("Seeding complete! Items inserted: {}", items.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_only_fills_an_empty_catalog() {
        let pool = db::connect_in_memory().await.unwrap();

        demo_catalog(&pool).await.unwrap();
        let catalog = CatalogRepository::new(&pool);
        let seeded = catalog.count().await.unwrap();
        assert_eq!(seeded, i64::try_from(demo_items().len()).unwrap());

        demo_catalog(&pool).await.unwrap();
        assert_eq!(catalog.count().await.unwrap(), seeded);
    }
}
