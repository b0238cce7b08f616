//! # discraft-common
//!
//! Shared utilities including configuration, error handling, credentials, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::Secret;
pub use config::{
    AppConfig, AppSettings, ConfigError, DiscordConfig, Environment, MinecraftConfig,
};
pub use error::{AppError, AppResult, BoxError, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
