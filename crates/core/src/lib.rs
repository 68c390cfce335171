//! Lustre Core - Shared domain types.
//!
//! This crate provides the types used across all Lustre components:
//! - `storefront` - Public catalog, cart, favorites and the back office
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Validation of submitted item fields, the closed set of
//! catalog sort orders and the set-like cart/favorites [`Selection`] all live
//! here so they can be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, amounts, items, catalog queries, selections, roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
