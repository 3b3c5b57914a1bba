//! Session authentication: password login, session lookup and logout.

use chrono::{Duration, Utc};
use domain::models::{User, UserSession};
use persistence::repositories::UserRepository;
use shared::crypto::{generate_session_token, sha256_hex};
use shared::password::{verify_login, PasswordError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A successful login: the user and the raw token for the cookie.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub session_token: String,
}

/// Authentication service backed by the `user_sessions` table.
pub struct AuthService {
    users: UserRepository,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(pool: PgPool, session_ttl_hours: i64) -> Self {
        Self {
            users: UserRepository::new(pool),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Checks the password and opens a new session.
    ///
    /// Unknown, inactive and wrong-password logins all fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user: Option<User> = self
            .users
            .find_by_username(username.trim())
            .await?
            .map(Into::into);

        let hash = user
            .as_ref()
            .filter(|u| u.is_active)
            .map(|u| u.password_hash.as_str());
        if !verify_login(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        let user = user.ok_or(AuthError::InvalidCredentials)?;

        let now = Utc::now();
        let purged = self.users.delete_expired_sessions(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Removed expired sessions");
        }

        let session_token = generate_session_token();
        self.users
            .create_session(user.id, &sha256_hex(&session_token), now + self.session_ttl)
            .await?;
        self.users.update_last_login(user.id, now).await?;

        Ok(LoginResult {
            user,
            session_token,
        })
    }

    /// Resolves a session cookie to its user. Sessions of deactivated
    /// users resolve to nothing.
    pub async fn resolve(&self, token: &str) -> Result<Option<(User, UserSession)>, AuthError> {
        let now = Utc::now();
        let Some(session) = self
            .users
            .find_active_session(&sha256_hex(token), now)
            .await?
        else {
            return Ok(None);
        };
        let session: UserSession = session.into();

        let Some(user) = self
            .users
            .find_by_id(session.user_id)
            .await?
            .map(User::from)
            .filter(|u| u.is_active)
        else {
            return Ok(None);
        };
        self.users.touch_session(session.id, now).await?;

        Ok(Some((user, session)))
    }

    /// Deletes the session behind a cookie token, if any.
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.users.delete_session_by_token(&sha256_hex(token)).await?)
    }
}
