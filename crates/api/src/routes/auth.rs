//! Login and logout pages.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use domain::models::user::LoginForm;
use domain::models::FormErrors;
use serde::Deserialize;
use shared::validation::is_safe_redirect;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{Flash, MaybeUser};
use crate::services::auth::AuthError;
use crate::services::{flash, CookieHelper, FlashMessage};
use crate::templates::{render_page, Layout, LoginPage};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Where to go after login: `next` when it is a local path, `/` otherwise.
fn redirect_target(next: Option<&str>) -> &str {
    next.filter(|n| is_safe_redirect(n)).unwrap_or("/")
}

/// GET /login/
pub async fn login_form(
    State(state): State<AppState>,
    MaybeUser(current): MaybeUser,
    flash: Flash,
    Query(query): Query<LoginQuery>,
) -> Result<Response, ApiError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let page = LoginPage {
        layout: Layout::new(&state, None, &flash),
        username: String::new(),
        next: redirect_target(query.next.as_deref()).to_string(),
        errors: FormErrors::new(),
    };
    render_page(&page, &flash, &state.cookies)
}

/// POST /login/
///
/// A failed login re-renders the form with one generic message, whatever
/// the cause.
pub async fn login(
    State(state): State<AppState>,
    flash: Flash,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let next = redirect_target(form.next.as_deref()).to_string();

    let errors = match form.validate() {
        Ok(()) => match state.auth().login(&form.username, &form.password).await {
            Ok(result) => {
                tracing::info!(user_id = %result.user.id, role = %result.user.role, "User logged in");
                let mut headers = HeaderMap::new();
                CookieHelper::append(
                    &mut headers,
                    &state.cookies.build_session_cookie(&result.session_token),
                );
                return Ok((headers, Redirect::to(&next)).into_response());
            }
            Err(AuthError::InvalidCredentials) => {
                tracing::info!(username = %form.username.trim(), "Login failed");
                FormErrors::from_message("Login failed.")
            }
            Err(e) => return Err(e.into()),
        },
        Err(e) => FormErrors::from(e),
    };

    let page = LoginPage {
        layout: Layout::new(&state, None, &flash),
        username: form.username,
        next,
        errors,
    };
    render_page(&page, &flash, &state.cookies)
}

/// GET /logout/
///
/// Deletes the server-side session, clears the cookie and returns to the
/// login page.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = state.cookies.extract_session_token(&headers) {
        if state.auth().logout(token).await? {
            tracing::info!("User logged out");
        }
    }

    let mut response_headers = HeaderMap::new();
    CookieHelper::append(
        &mut response_headers,
        &state.cookies.build_clear_session_cookie(),
    );
    CookieHelper::append(
        &mut response_headers,
        &state
            .cookies
            .build_flash_cookie(&flash::encode(&[FlashMessage::info("You have been logged out.")])),
    );
    Ok((response_headers, Redirect::to("/login/")).into_response())
}
