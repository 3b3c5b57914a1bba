use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use domain::models::UserRole;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub club: ClubConfig,
    /// Courts and users created at startup when missing.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool settings in the shape the persistence crate expects.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Login session cookie settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_flash_cookie_name")]
    pub flash_cookie_name: String,

    /// Session lifetime in hours (default: two weeks).
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: i64,

    /// Set the `Secure` attribute. Enable behind HTTPS.
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_same_site")]
    pub same_site: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
    #[serde(default = "default_club_name")]
    pub name: String,

    /// Offset of the club's local time from UTC, used to decide "today".
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_calendar_initial_view")]
    pub calendar_initial_view: String,

    #[serde(default = "default_calendar_slot_min_time")]
    pub calendar_slot_min_time: String,

    #[serde(default = "default_calendar_slot_max_time")]
    pub calendar_slot_max_time: String,
}

impl ClubConfig {
    /// The club's fixed UTC offset. Out-of-range values fall back to UTC;
    /// [`Config::validate`] rejects them at startup.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Today's date on the club's clock.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub courts: Vec<String>,

    #[serde(default)]
    pub users: Vec<BootstrapUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapUser {
    pub username: String,
    pub password: String,
    #[serde(default = "default_bootstrap_role")]
    pub role: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_cookie_name() -> String {
    "club_session".to_string()
}
fn default_flash_cookie_name() -> String {
    "club_flash".to_string()
}
fn default_session_ttl_hours() -> i64 {
    24 * 14
}
fn default_same_site() -> String {
    "Lax".to_string()
}
fn default_club_name() -> String {
    "Tennis Club".to_string()
}
fn default_utc_offset_minutes() -> i32 {
    540
}
fn default_calendar_initial_view() -> String {
    "timeGridWeek".to_string()
}
fn default_calendar_slot_min_time() -> String {
    "06:00:00".to_string()
}
fn default_calendar_slot_max_time() -> String {
    "22:00:00".to_string()
}
fn default_bootstrap_role() -> String {
    "customer".to_string()
}

/// Largest offsets in use world-wide: UTC-12:00 and UTC+14:00.
const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const TEST_DEFAULTS: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 8080
    request_timeout_secs = 30

    [database]
    url = ""
    max_connections = 5
    min_connections = 0
    connect_timeout_secs = 5
    idle_timeout_secs = 600

    [logging]
    level = "info"
    format = "pretty"

    [session]
    cookie_name = "club_session"
    flash_cookie_name = "club_flash"
    ttl_hours = 336
    secure = false
    same_site = "Lax"

    [club]
    name = "Tennis Club"
    utc_offset_minutes = 540
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CLUB__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CLUB").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a config from embedded defaults plus overrides, without
    /// touching the file system or validating.
    #[doc(hidden)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(TEST_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CLUB__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.session.ttl_hours <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "session.ttl_hours must be positive".to_string(),
            ));
        }

        if !(MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&self.club.utc_offset_minutes)
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "club.utc_offset_minutes must be between {MIN_UTC_OFFSET_MINUTES} and {MAX_UTC_OFFSET_MINUTES}"
            )));
        }

        for user in &self.bootstrap.users {
            if UserRole::parse(&user.role).is_none() {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "bootstrap user '{}' has unknown role '{}'",
                    user.username, user.role
                )));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
