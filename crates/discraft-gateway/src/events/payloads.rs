//! Event payload definitions
//!
//! Only the fields the bridge reads are modelled; unknown fields are ignored.

use discraft_core::Snowflake;
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u8,

    /// The authenticated bot user
    pub user: UserPayload,

    /// Guilds the bot is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,

    /// Application owning the bot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationPayload>,
}

/// Unavailable guild in READY event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// Partial application object in READY event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub flags: u64,
}

// === User Payload ===

/// User data included in events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

// === Channel Events ===

/// CHANNEL_CREATE event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub channel_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

// === Message Events ===

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub mention_everyone: bool,
    /// Users specifically mentioned in the message
    #[serde(default)]
    pub mentions: Vec<UserPayload>,
}

impl MessageCreateEvent {
    /// Check whether `user_id` is in the mention list
    #[must_use]
    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.iter().any(|m| m.id == user_id)
    }
}
