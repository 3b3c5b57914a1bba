//! Startup provisioning of courts and accounts.
//!
//! Runs after migrations. Existing courts and users are left untouched, so
//! the step is safe to repeat on every boot.

use domain::models::{Court, UserRole};
use persistence::repositories::{CourtRepository, UserRepository};
use shared::password::{hash_password, PasswordError};
use shared::validation::validate_username;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::BootstrapConfig;

/// Error types for bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What a bootstrap run created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub courts_created: usize,
    pub users_created: usize,
}

/// Create the configured courts and users that do not exist yet.
pub async fn bootstrap(
    pool: &PgPool,
    config: &BootstrapConfig,
) -> Result<BootstrapReport, BootstrapError> {
    let mut report = BootstrapReport::default();

    let courts = CourtRepository::new(pool.clone());
    for name in config.courts.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !Court::is_valid_name(name) {
            return Err(BootstrapError::Config(format!(
                "court name '{}' is longer than {} characters",
                name,
                domain::models::court::MAX_COURT_NAME_LEN
            )));
        }
        let (court, created) = courts.create_if_missing(name).await?;
        if created {
            info!(court_id = %court.id, court = %court.name, "Court created");
            report.courts_created += 1;
        }
    }

    let users = UserRepository::new(pool.clone());
    for user in &config.users {
        let role = UserRole::parse(&user.role).ok_or_else(|| {
            BootstrapError::Config(format!(
                "unknown role '{}' for user '{}'",
                user.role, user.username
            ))
        })?;
        validate_username(&user.username).map_err(|_| {
            BootstrapError::Config(format!("invalid username '{}'", user.username))
        })?;

        if users.find_by_username(&user.username).await?.is_some() {
            continue;
        }
        if user.password.is_empty() {
            warn!(username = %user.username, "Bootstrap user has an empty password - skipping");
            continue;
        }

        let password_hash = hash_password(&user.password)?;
        let created = users
            .create_user(
                &user.username,
                &password_hash,
                user.display_name.as_deref(),
                role,
            )
            .await?;
        info!(user_id = %created.id, username = %created.username, role = %role, "User created");
        report.users_created += 1;
    }

    if !config.users.is_empty() {
        warn!(
            "SECURITY: bootstrap passwords are read from configuration; \
             remove them once the accounts exist"
        );
    }

    Ok(report)
}
