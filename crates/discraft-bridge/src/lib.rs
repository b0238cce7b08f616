//! # discraft-bridge
//!
//! Fuses the gateway event stream with the game server event stream into
//! chat messages and presence updates.

pub mod app;
pub mod coordinator;
pub mod error;
pub mod sinks;
pub mod state;

pub use app::run;
pub use coordinator::Coordinator;
pub use error::BridgeError;
pub use sinks::{MessageSink, PresenceSink};
pub use state::{Action, BridgeState};
