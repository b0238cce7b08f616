//! Dispatch event names
//!
//! Names accepted in the `t` field of a dispatch frame. Any other name is a
//! decode error.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    Ready,
    MessageCreate,
    ChannelCreate,
}

const NAMES: [(GatewayEventType, &str); 3] = [
    (GatewayEventType::Ready, "READY"),
    (GatewayEventType::MessageCreate, "MESSAGE_CREATE"),
    (GatewayEventType::ChannelCreate, "CHANNEL_CREATE"),
];

impl GatewayEventType {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find_map(|(event, name)| (*event == self).then_some(*name))
            .unwrap_or_default()
    }

    /// Exact, case-sensitive lookup of a wire name
    #[must_use]
    pub fn from_str(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find_map(|(event, known)| (*known == name).then_some(*event))
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
