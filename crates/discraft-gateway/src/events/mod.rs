//! Gateway events
//!
//! Dispatch events received from the gateway.

mod dispatch;
mod event_types;
mod payloads;

pub use dispatch::DispatchEvent;
pub use event_types::GatewayEventType;
pub use payloads::{
    ApplicationPayload, ChannelEvent, MessageCreateEvent, ReadyEvent, UnavailableGuild,
    UserPayload,
};
