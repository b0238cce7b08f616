//! Application configuration structs
//!
//! Loads configuration from environment variables (and an optional `.env` file).

use crate::auth::Secret;
use discraft_core::{Intents, Snowflake};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub minecraft: MinecraftConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Chat platform settings
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot credential
    pub token: Secret,
    /// Channel receiving game-server announcements
    pub channel_id: Snowflake,
    /// REST API base URL, without trailing slash
    pub api_base: String,
    /// Intents declared at Identify
    pub intents: Intents,
}

/// Game server settings
#[derive(Debug, Clone)]
pub struct MinecraftConfig {
    /// Server log followed for join/part/chat lines
    pub log_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Interval between status queries
    pub poll_interval: Duration,
    /// Timeout of a single status query
    pub ping_timeout: Duration,
}

impl MinecraftConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Default value functions
fn default_app_name() -> String {
    "discraft".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_ping_timeout_secs() -> u64 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Every required key is checked before any component is constructed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        let token = required("DISCRAFT_TOKEN")?;
        let channel_id = required("DISCRAFT_CHANNEL_ID")?;
        let log_path = required("DISCRAFT_MC_LOG")?;
        let host = required("DISCRAFT_MC_HOST")?;
        let port = required("DISCRAFT_MC_PORT")?;

        let channel_id = Snowflake::parse(&channel_id)
            .map_err(|e| ConfigError::InvalidValue("DISCRAFT_CHANNEL_ID", e.to_string()))?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue("DISCRAFT_MC_PORT", e.to_string()))?;

        let optional_u64 = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue(key, e.to_string())),
                None => Ok(default),
            }
        };

        let poll_interval = optional_u64("DISCRAFT_POLL_INTERVAL_SECS", default_poll_interval_secs())?;
        if poll_interval == 0 {
            return Err(ConfigError::InvalidValue(
                "DISCRAFT_POLL_INTERVAL_SECS",
                "must be greater than zero".to_string(),
            ));
        }
        let ping_timeout = optional_u64("DISCRAFT_PING_TIMEOUT_SECS", default_ping_timeout_secs())?;
        let intents = optional_u64("DISCRAFT_INTENTS", Intents::DEFAULT.bits())?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            discord: DiscordConfig {
                token: Secret::new(token.trim()),
                channel_id,
                api_base: lookup("DISCRAFT_API_BASE")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                intents: Intents::from_bits_retain(intents),
            },
            minecraft: MinecraftConfig {
                log_path: PathBuf::from(log_path),
                host,
                port,
                poll_interval: Duration::from_secs(poll_interval),
                ping_timeout: Duration::from_secs(ping_timeout),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
