//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token signing configuration.
    pub auth: AuthConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Background job configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access and refresh tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_secs: i64,
}

/// Local upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// URL prefix the uploads directory is served under.
    #[serde(default = "default_uploads_url")]
    pub base_url: String,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the user activity sweep runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between two user activity sweeps.
    #[serde(default = "default_activity_sweep_interval")]
    pub activity_sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            base_url: default_uploads_url(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            activity_sweep_interval_secs: default_activity_sweep_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_access_token_ttl() -> i64 {
    60 * 60
}

const fn default_refresh_token_ttl() -> i64 {
    30 * 24 * 60 * 60
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_uploads_url() -> String {
    "/uploads".to_string()
}

const fn default_activity_sweep_interval() -> u64 {
    24 * 60 * 60
}

const fn default_true() -> bool {
    true
}

impl Config {
    fn checked(config: Self) -> Result<Self, config::ConfigError> {
        if config.scheduler.activity_sweep_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "scheduler.activity_sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (only to populate the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `INKWELL_ENV`)
    /// 4. Environment variables with `INKWELL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();

        let env = std::env::var("INKWELL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("INKWELL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(config.try_deserialize()?)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("INKWELL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(config.try_deserialize()?)
    }
}
