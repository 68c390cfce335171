//! Jewelry items and the typed decoding of the admin item form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amount::{AmountError, Carat, Price};
use super::id::ItemId;

/// Validated, storable fields of a jewelry item.
///
/// Shared by create and update: an update replaces every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub carat: Option<Carat>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
}

impl ItemFields {
    /// Minimal fields for an item with a name and a price.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            carat: None,
            category: None,
            image_url: None,
            is_featured: false,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub const fn with_carat(mut self, carat: Carat) -> Self {
        self.carat = Some(carat);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    #[must_use]
    pub const fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }
}

/// A persisted jewelry item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JewelryItem {
    pub id: ItemId,
    pub fields: ItemFields,
}

/// Reasons the admin item form is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Price is required")]
    MissingPrice,
    #[error("Price {0}")]
    InvalidPrice(AmountError),
    #[error("Carat {0}")]
    InvalidCarat(AmountError),
}

/// The item form exactly as submitted, before validation.
///
/// Every text field defaults to empty and `is_featured` to `false`, so a
/// form that omits the checkbox decodes the same as an unchecked one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub carat: String,
    pub category: String,
    pub image_url: String,
    #[serde(deserialize_with = "flag_present")]
    pub is_featured: bool,
}

/// Any submitted value for a checkbox means "checked", whatever its text.
fn flag_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.is_some())
}

impl ItemDraft {
    /// Decode a draft from `(name, value)` form pairs.
    ///
    /// Unknown field names are ignored. The presence of `is_featured`, not its
    /// value, marks the item as featured.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut draft = Self::default();
        for (key, value) in fields {
            match key.as_ref() {
                "name" => draft.name = value.into(),
                "description" => draft.description = value.into(),
                "price" => draft.price = value.into(),
                "carat" => draft.carat = value.into(),
                "category" => draft.category = value.into(),
                "image_url" => draft.image_url = value.into(),
                "is_featured" => draft.is_featured = true,
                _ => {}
            }
        }
        draft
    }

    /// Prefill a draft from a stored item (edit form).
    #[must_use]
    pub fn from_item(item: &JewelryItem) -> Self {
        let fields = &item.fields;
        Self {
            name: fields.name.clone(),
            description: fields.description.clone().unwrap_or_default(),
            price: fields.price.amount().to_string(),
            carat: fields
                .carat
                .map(|c| c.weight().to_string())
                .unwrap_or_default(),
            category: fields.category.clone().unwrap_or_default(),
            image_url: fields.image_url.clone().unwrap_or_default(),
            is_featured: fields.is_featured,
        }
    }

    /// Validate the draft into storable fields.
    ///
    /// Text is trimmed; empty optional text becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns the first `ItemValidationError` found, checking name, price
    /// and carat in form order.
    pub fn validate(&self) -> Result<ItemFields, ItemValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ItemValidationError::MissingName);
        }

        let price = self.price.trim();
        if price.is_empty() {
            return Err(ItemValidationError::MissingPrice);
        }
        let price = price
            .parse::<Price>()
            .map_err(ItemValidationError::InvalidPrice)?;

        let carat = match self.carat.trim() {
            "" => None,
            raw => Some(
                raw.parse::<Carat>()
                    .map_err(ItemValidationError::InvalidCarat)?,
            ),
        };

        Ok(ItemFields {
            name: name.to_owned(),
            description: non_empty(&self.description),
            price,
            carat,
            category: non_empty(&self.category),
            image_url: non_empty(&self.image_url),
            is_featured: self.is_featured,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
