//! Core types for Lustre.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod id;
pub mod item;
pub mod query;
pub mod role;
pub mod selection;

pub use amount::{AmountError, Carat, Price};
pub use id::*;
pub use item::{ItemDraft, ItemFields, ItemValidationError, JewelryItem};
pub use query::{CatalogQuery, CategoryFilter, SortOrder, UnknownSortKey};
pub use role::Role;
pub use selection::{Selection, Toggle};
