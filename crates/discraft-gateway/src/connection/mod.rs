//! Gateway connection management
//!
//! Session state and the outbound frame path.

mod connection;
mod session;

pub use connection::{write_frames, Connection, OUTBOUND_BUFFER_SIZE};
pub use session::{Heartbeat, Session, SessionState};
