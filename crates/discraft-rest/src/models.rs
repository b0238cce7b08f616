//! API response models

use discraft_core::Snowflake;
use serde::{Deserialize, Serialize};

/// `GET /gateway/bot` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayBot {
    /// WebSocket URL to connect to
    pub url: String,
    /// Recommended shard count
    #[serde(default)]
    pub shards: Option<u32>,
}

/// Message object returned by `POST /channels/{id}/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub content: String,
}

/// `POST /channels/{id}/messages` body
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateMessage<'a> {
    pub content: &'a str,
}
