//! Service layer for the web front end.

pub mod auth;
pub mod bootstrap;
pub mod cookies;
pub mod flash;

pub use auth::{AuthError, AuthService, LoginResult};
pub use bootstrap::{bootstrap, BootstrapError, BootstrapReport};
pub use cookies::CookieHelper;
pub use flash::{FlashLevel, FlashMessage};
