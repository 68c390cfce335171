//! Domain models for the storefront.
//!
//! [`user`] holds rows read from the database; everything stored in a
//! visitor's session is in [`session`].

pub mod flash;
pub mod session;
pub mod user;

pub use flash::{Flash, FlashLevel};
pub use session::CurrentUser;
pub use user::UserRecord;
