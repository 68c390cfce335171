//! Business logic services for the storefront.
//!
//! - `auth` - Password login, account management, admin seed
//! - `catalog` - Resolves listing parameters and runs catalog queries
//! - `uploads` - Item image uploads

pub mod auth;
pub mod catalog;
pub mod uploads;
