//! Reads the flash cookie set by the previous redirect.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::app::AppState;
use crate::services::flash::{self, FlashMessage};

/// Messages waiting in the flash cookie.
///
/// `present` tells the page renderer to clear the cookie once shown.
#[derive(Debug, Clone, Default)]
pub struct Flash {
    pub messages: Vec<FlashMessage>,
    pub present: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(match state.cookies.extract_flash(&parts.headers) {
            Some(raw) => Flash {
                messages: flash::decode(raw),
                present: true,
            },
            None => Flash::default(),
        })
    }
}
