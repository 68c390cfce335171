//! Display data for templates.
//!
//! Templates only print fields and test booleans; every comparison and
//! formatting decision is made here.

use lustre_core::{CategoryFilter, JewelryItem, Selection, SortOrder};
use tower_sessions::session::Error as SessionError;

use crate::middleware::Visitor;
use crate::models::Flash;

/// Layout data shared by every page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub flashes: Vec<Flash>,
    pub cart_count: usize,
    pub favorites_count: usize,
    pub username: Option<String>,
    pub is_admin: bool,
}

impl PageContext {
    /// Build the layout data, consuming the visitor's queued flashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or modified.
    pub async fn load(visitor: &Visitor) -> Result<Self, SessionError> {
        let user = visitor.current_user().await?;

        Ok(Self {
            flashes: visitor.take_flashes().await?,
            cart_count: visitor.cart().await?.len(),
            favorites_count: visitor.favorites().await?.len(),
            is_admin: user.as_ref().is_some_and(|u| u.is_admin()),
            username: user.map(|u| u.username),
        })
    }
}

/// One catalog item as shown in listings.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub carat: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub is_favorite: bool,
    pub in_cart: bool,
}

impl ItemView {
    #[must_use]
    pub fn new(item: &JewelryItem, cart: &Selection, favorites: &Selection) -> Self {
        let fields = &item.fields;
        Self {
            id: item.id.as_i64(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price.to_string(),
            carat: fields.carat.map(|c| c.to_string()),
            category: fields.category.clone(),
            image_url: fields.image_url.clone(),
            is_featured: fields.is_featured,
            is_favorite: favorites.contains(item.id),
            in_cart: cart.contains(item.id),
        }
    }

    /// Views for a list of items.
    #[must_use]
    pub fn list(items: &[JewelryItem], cart: &Selection, favorites: &Selection) -> Vec<Self> {
        items
            .iter()
            .map(|item| Self::new(item, cart, favorites))
            .collect()
    }
}

/// An entry of the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl CategoryOption {
    /// "All" followed by each known category.
    #[must_use]
    pub fn list(categories: &[String], current: &CategoryFilter) -> Vec<Self> {
        let all = Self {
            value: CategoryFilter::ALL_KEY.to_owned(),
            label: "All".to_owned(),
            selected: *current == CategoryFilter::All,
        };

        std::iter::once(all)
            .chain(categories.iter().map(|category| Self {
                value: category.clone(),
                label: category.clone(),
                selected: matches!(current, CategoryFilter::Exact(c) if c == category),
            }))
            .collect()
    }
}

/// An entry of the sort selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SortOption {
    #[must_use]
    pub fn list(current: SortOrder) -> Vec<Self> {
        SortOrder::ALL
            .into_iter()
            .map(|order| Self {
                key: order.key(),
                label: order.label(),
                selected: order == current,
            })
            .collect()
    }
}
