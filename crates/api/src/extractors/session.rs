//! Session cookie authentication extractors.
//!
//! The resolved user is cached in the request extensions so that several
//! extractors in one handler cost a single lookup.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use domain::models::User;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{ApiError, JsonError};

/// The logged-in user behind the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: Uuid,
}

/// Why a login-only page refused a request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Anonymous visitor; sent to the login page and back to `next` afterwards.
    Login { next: String },
    Error(ApiError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login { next } => Redirect::to(&login_url(&next)).into_response(),
            AuthRejection::Error(err) => err.into_response(),
        }
    }
}

impl From<ApiError> for AuthRejection {
    fn from(err: ApiError) -> Self {
        AuthRejection::Error(err)
    }
}

/// `/login/?next=<path>` with the path percent-encoded.
pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(next))
}

async fn resolve_user(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, ApiError> {
    if let Some(current) = parts.extensions.get::<CurrentUser>() {
        return Ok(Some(current.clone()));
    }

    let Some(token) = state.cookies.extract_session_token(&parts.headers) else {
        return Ok(None);
    };

    let current = state
        .auth()
        .resolve(token)
        .await?
        .map(|(user, session)| CurrentUser {
            user,
            session_id: session.id,
        });

    if let Some(current) = &current {
        parts.extensions.insert(current.clone());
    }
    Ok(current)
}

fn requested_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await? {
            Some(current) => Ok(current),
            None => Err(AuthRejection::Login {
                next: requested_path(parts),
            }),
        }
    }
}

/// A logged-in coach. Customers get a 403 page.
#[derive(Debug, Clone)]
pub struct CoachUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for CoachUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.is_coach() {
            tracing::warn!(user_id = %current.user.id, "Coach-only page requested by customer");
            return Err(AuthRejection::Error(ApiError::Forbidden(
                "Only coaches can manage availability.".to_string(),
            )));
        }
        Ok(CoachUser(current))
    }
}

/// A logged-in user for the JSON feed; anonymous requests get a 401 JSON body.
#[derive(Debug, Clone)]
pub struct ApiUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = JsonError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(ApiUser)
            .ok_or_else(|| JsonError(ApiError::Unauthorized("Authentication required".into())))
    }
}

/// The session user when there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/"), "/login/?next=%2F");
        assert_eq!(
            login_url("/reservations/?tab=past"),
            "/login/?next=%2Freservations%2F%3Ftab%3Dpast"
        );
    }

    #[test]
    fn test_login_rejection_redirects() {
        let response = AuthRejection::Login {
            next: "/calendar/".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login/?next=%2Fcalendar%2F");
    }

    #[test]
    fn test_error_rejection_keeps_status() {
        let response = AuthRejection::from(ApiError::Forbidden("no".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
