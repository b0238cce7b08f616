//! Inbound frame handlers
//!
//! Routes decoded envelopes to the handshake, heartbeat and dispatch logic.

mod dispatch;
mod heartbeat;
mod hello;

pub use dispatch::MessageDispatcher;
pub use heartbeat::HeartbeatHandler;
pub use hello::HelloHandler;
