//! Typed dispatch events

use super::{ChannelEvent, GatewayEventType, MessageCreateEvent, ReadyEvent};

/// A decoded dispatch event, keyed by its event type
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Ready(ReadyEvent),
    MessageCreate(MessageCreateEvent),
    ChannelCreate(ChannelEvent),
}

impl DispatchEvent {
    #[must_use]
    pub fn event_type(&self) -> GatewayEventType {
        match self {
            Self::Ready(_) => GatewayEventType::Ready,
            Self::MessageCreate(_) => GatewayEventType::MessageCreate,
            Self::ChannelCreate(_) => GatewayEventType::ChannelCreate,
        }
    }

    /// Decode `data` as the payload of `event_type`
    pub fn from_value(
        event_type: GatewayEventType,
        data: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match event_type {
            GatewayEventType::Ready => Self::Ready(serde_json::from_value(data)?),
            GatewayEventType::MessageCreate => Self::MessageCreate(serde_json::from_value(data)?),
            GatewayEventType::ChannelCreate => Self::ChannelCreate(serde_json::from_value(data)?),
        })
    }

    /// Encode the payload back to JSON
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Ready(e) => serde_json::to_value(e),
            Self::MessageCreate(e) => serde_json::to_value(e),
            Self::ChannelCreate(e) => serde_json::to_value(e),
        }
    }
}
