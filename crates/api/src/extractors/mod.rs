//! Custom Axum extractors.
//!
//! Session-based user extractors and the flash message reader.

pub mod flash;
pub mod session;

pub use flash::Flash;
pub use session::{login_url, ApiUser, AuthRejection, CoachUser, CurrentUser, MaybeUser};
