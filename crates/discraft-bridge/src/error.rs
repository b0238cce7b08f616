//! Bridge errors

use discraft_gateway::GatewayError;
use discraft_rest::RestError;
use thiserror::Error;

/// Failure of one outbound action
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to post message: {0}")]
    Post(#[from] RestError),

    #[error("Failed to update presence: {0}")]
    Presence(#[from] GatewayError),
}
