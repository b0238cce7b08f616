//! Application error types
//!
//! Top-level error of the bridge process and its exit code convention.

use crate::config::ConfigError;

/// Error source carried by the adapter variants of [`AppError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Exit code for a clean shutdown (also used when the gateway asks us to reconnect)
pub const EXIT_OK: i32 = 0;
/// Exit code for fatal runtime failures; the supervisor may restart the process
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for missing or invalid configuration (EX_CONFIG); restarting will not help
pub const EXIT_CONFIG: i32 = 78;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(#[source] BoxError),

    #[error("Gateway requested a reconnect")]
    ReconnectRequested,

    // REST errors
    #[error("REST error: {0}")]
    Rest(#[source] BoxError),

    // Game server adapter errors
    #[error("Game server error: {0}")]
    GameServer(#[source] BoxError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::ReconnectRequested => EXIT_OK,
            Self::Gateway(_) | Self::Rest(_) | Self::GameServer(_) | Self::Internal(_) => {
                EXIT_FAILURE
            }
        }
    }

    pub fn gateway(err: impl Into<BoxError>) -> Self {
        Self::Gateway(err.into())
    }

    pub fn rest(err: impl Into<BoxError>) -> Self {
        Self::Rest(err.into())
    }

    pub fn game_server(err: impl Into<BoxError>) -> Self {
        Self::GameServer(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Result type alias using `AppError`
pub type AppResult<T> = Result<T, AppError>;
