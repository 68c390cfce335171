//! Catalog listing parameters as closed enumerations.
//!
//! Request parameters arrive as free text. They are resolved here into a
//! [`CatalogQuery`] whose variants are the only shapes a catalog listing can
//! take; unrecognized input falls back to the defaults instead of erroring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort orders offered on the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    CaratAsc,
    CaratDesc,
}

/// A sort key outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl SortOrder {
    /// Every sort order, in the order the catalog page offers them.
    pub const ALL: [Self; 4] = [
        Self::PriceAsc,
        Self::PriceDesc,
        Self::CaratAsc,
        Self::CaratDesc,
    ];

    /// Query-string key, e.g. `price_asc`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::CaratAsc => "carat_asc",
            Self::CaratDesc => "carat_desc",
        }
    }

    /// Human-readable label for the sort selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::CaratAsc => "Carat: Low to High",
            Self::CaratDesc => "Carat: High to Low",
        }
    }

    /// Parse a raw query value, falling back to the default for anything unknown.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.key() == s)
            .ok_or_else(|| UnknownSortKey(s.to_owned()))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Category restriction for a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive match on the item category.
    Exact(String),
}

impl CategoryFilter {
    /// Query-string value meaning "no restriction".
    pub const ALL_KEY: &'static str = "all";

    /// Resolve a raw query value against the categories currently in the catalog.
    ///
    /// Absent, `all`, or any value that is not a known category resolves to
    /// [`CategoryFilter::All`].
    #[must_use]
    pub fn resolve(raw: Option<&str>, known: &[String]) -> Self {
        match raw {
            Some(value) if value != Self::ALL_KEY && known.iter().any(|c| c == value) => {
                Self::Exact(value.to_owned())
            }
            _ => Self::All,
        }
    }

    /// Query-string value for this filter.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::All => Self::ALL_KEY,
            Self::Exact(category) => category,
        }
    }
}

/// A fully resolved catalog listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

impl CatalogQuery {
    #[must_use]
    pub const fn new(category: CategoryFilter, sort: SortOrder) -> Self {
        Self { category, sort }
    }

    /// Resolve raw `category` and `sort` query values.
    #[must_use]
    pub fn resolve(category: Option<&str>, sort: Option<&str>, known: &[String]) -> Self {
        Self {
            category: CategoryFilter::resolve(category, known),
            sort: SortOrder::parse_or_default(sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        vec!["necklaces".to_owned(), "rings".to_owned()]
    }

    #[test]
    fn test_sort_keys_roundtrip() {
        for order in SortOrder::ALL {
            assert_eq!(order.key().parse::<SortOrder>(), Ok(order));
        }
    }

    #[test]
    fn test_unknown_sort_falls_back_to_price_ascending() {
        assert_eq!(SortOrder::parse_or_default(None), SortOrder::PriceAsc);
        assert_eq!(
            SortOrder::parse_or_default(Some("name; DROP TABLE jewelry")),
            SortOrder::PriceAsc
        );
        assert_eq!(SortOrder::parse_or_default(Some("PRICE_DESC")), SortOrder::PriceAsc);
        assert_eq!(
            SortOrder::parse_or_default(Some("carat_desc")),
            SortOrder::CaratDesc
        );
    }

    #[test]
    fn test_category_resolves_only_known_values() {
        assert_eq!(
            CategoryFilter::resolve(Some("rings"), &known()),
            CategoryFilter::Exact("rings".to_owned())
        );
        assert_eq!(CategoryFilter::resolve(Some("all"), &known()), CategoryFilter::All);
        assert_eq!(CategoryFilter::resolve(None, &known()), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::resolve(Some("rings' OR '1'='1"), &known()),
            CategoryFilter::All
        );
        assert_eq!(CategoryFilter::resolve(Some("Rings"), &known()), CategoryFilter::All);
    }

    #[test]
    fn test_category_key() {
        assert_eq!(CategoryFilter::All.key(), "all");
        assert_eq!(CategoryFilter::Exact("rings".to_owned()).key(), "rings");
    }

    #[test]
    fn test_catalog_query_resolve() {
        let query = CatalogQuery::resolve(Some("necklaces"), Some("carat_asc"), &known());
        assert_eq!(
            query,
            CatalogQuery::new(
                CategoryFilter::Exact("necklaces".to_owned()),
                SortOrder::CaratAsc
            )
        );
        assert_eq!(CatalogQuery::resolve(None, None, &[]), CatalogQuery::default());
    }
}
