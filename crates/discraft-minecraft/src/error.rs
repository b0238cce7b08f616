//! Adapter errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Log follower errors
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Status query errors
#[derive(Debug, Error)]
pub enum PingError {
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Status query I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Status query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed status response: {0}")]
    Protocol(String),

    #[error("Invalid status JSON: {0}")]
    Json(#[from] serde_json::Error),
}
