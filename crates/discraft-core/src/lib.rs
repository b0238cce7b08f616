//! # discraft-core
//!
//! Domain layer shared by the gateway, the game-server adapters and the bridge.
//! This crate performs no I/O.

pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{strip_self_mentions, Command, Roster, PING_FAILED_STATUS};
pub use events::ServerEvent;
pub use value_objects::{Intents, Snowflake, SnowflakeParseError};
