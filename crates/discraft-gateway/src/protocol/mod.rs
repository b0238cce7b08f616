//! Gateway wire protocol
//!
//! Op codes, the raw frame format and the typed envelope built on top of it.

mod envelope;
mod messages;
mod opcodes;
mod payloads;

pub use envelope::{Envelope, Payload};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    Activity, HelloPayload, IdentifyPayload, IdentifyProperties, PresenceUpdatePayload,
};
