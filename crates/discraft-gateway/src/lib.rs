//! # discraft-gateway
//!
//! Client side of the chat platform's real-time gateway: one long-lived
//! WebSocket session with its Hello/Identify/Ready handshake, a heartbeat
//! ticker started exactly once, and a typed stream of dispatch events.

pub mod client;
pub mod connection;
pub mod error;
pub mod events;
pub mod handlers;
pub mod protocol;

pub use client::{gateway_url, GatewayClient, GatewayConfig};
pub use connection::{Connection, Session, SessionState};
pub use error::{DecodeError, GatewayError, GatewayResult};
pub use events::{DispatchEvent, GatewayEventType};
pub use protocol::{Envelope, OpCode, Payload};
