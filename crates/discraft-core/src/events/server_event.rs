//! Game server events
//!
//! Produced by the log follower and the status poller, consumed by the bridge.

use serde::{Deserialize, Serialize};

/// All events observed on the game server side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    // =========================================================================
    // Log Events
    // =========================================================================
    /// A player joined the game
    Join { user: String },
    /// A player left the game
    Part { user: String },
    /// A player said something in game chat
    Chat { user: String, text: String },

    // =========================================================================
    // Status Poll Events
    // =========================================================================
    /// Fresh roster from a successful status query
    Roster { players: Vec<String> },
    /// The status query could not reach the server
    PingFailed { reason: String },
}

impl ServerEvent {
    /// Get the event type name
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Join { .. } => "JOIN",
            Self::Part { .. } => "PART",
            Self::Chat { .. } => "CHAT",
            Self::Roster { .. } => "ROSTER",
            Self::PingFailed { .. } => "PING_FAILED",
        }
    }

    /// The chat line announcing a log event, if any
    ///
    /// Join -> `<user> joined`, part -> `<user> left`, chat -> `<user>: <text>`.
    #[must_use]
    pub fn announcement(&self) -> Option<String> {
        match self {
            Self::Join { user } => Some(format!("{user} joined")),
            Self::Part { user } => Some(format!("{user} left")),
            Self::Chat { user, text } => Some(format!("{user}: {text}")),
            Self::Roster { .. } | Self::PingFailed { .. } => None,
        }
    }
}
