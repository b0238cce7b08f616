//! # discraft-minecraft
//!
//! Event sources on the game server side: the server log (joins, parts and
//! chat lines) and the periodic Server List Ping status query.

pub mod error;
pub mod log;
pub mod ping;

pub use error::{LogError, PingError};
pub use log::{classify_line, LogFollower, EOF_SENTINEL};
pub use ping::{ServerListPing, StatusPoller, StatusQuery, StatusResponse};
