//! Gateway error types
//!
//! `DecodeError` covers a single malformed frame and is recovered by the
//! receive loop. `GatewayError` ends the session.

use crate::protocol::OpCode;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure to decode one inbound frame
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not a valid JSON gateway object
    #[error("Invalid frame JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Op code outside the recognized set
    #[error("Unknown op code: {0}")]
    UnknownOpcode(u64),

    /// Dispatch frame without a `t` field
    #[error("Dispatch frame without event type")]
    MissingEventType,

    /// Dispatch event name outside the recognized set
    #[error("Unknown dispatch event type: {0:?}")]
    UnknownEventType(String),

    /// Op code requires a `d` payload but none was sent
    #[error("Missing payload for op {0}")]
    MissingPayload(OpCode),

    /// Payload does not match the shape required by (op, t)
    #[error("Invalid payload for op {op}{}: {source}", .event.as_deref().map(|t| format!(" t={t}")).unwrap_or_default())]
    InvalidPayload {
        op: OpCode,
        event: Option<String>,
        #[source]
        source: serde_json::Error,
    },
}

/// Session-ending gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to connect to gateway: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("Failed to read from gateway: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("Failed to write to gateway: {0}")]
    Write(#[source] tungstenite::Error),

    #[error("Gateway connection closed{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    ConnectionClosed { reason: Option<String> },

    #[error("Gateway requested a reconnect")]
    ReconnectRequested,

    #[error("Gateway invalidated the session (resumable: {resumable})")]
    InvalidSession { resumable: bool },

    #[error("Failed to encode outbound frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// The outbound writer task is gone
    #[error("Gateway writer stopped")]
    WriterClosed,

    /// Nobody consumes dispatch events any more
    #[error("Dispatch event consumer stopped")]
    EventsClosed,
}

impl GatewayError {
    /// Whether the gateway itself asked us to drop the session
    #[must_use]
    pub fn is_reconnect_request(&self) -> bool {
        matches!(self, Self::ReconnectRequested | Self::InvalidSession { .. })
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
