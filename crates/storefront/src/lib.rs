//! Lustre storefront library.
//!
//! A jewelry catalog with a per-visitor cart and favorites, session login and
//! an admin back office for managing items. The binary in `main.rs` wires
//! configuration, Sentry and tracing around [`routes::app`]; everything else
//! lives here so it can be driven by the CLI and the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redirect;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
