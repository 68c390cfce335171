//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded in the span, echoed in the response)
//! 4. Session layer (tower-sessions with the `SQLite` store)
//!
//! # Extractors
//!
//! - [`Visitor`] - cart, favorites, login state and flashes of the session
//! - [`RequireAdmin`] - rejects anyone but an admin before the handler runs

pub mod auth;
pub mod request_id;
pub mod session;
pub mod visitor;

pub use auth::{GuardDenial, RequireAdmin, authorize_admin};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use visitor::Visitor;
