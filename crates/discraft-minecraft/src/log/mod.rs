//! Server log adapter

mod classify;
mod follower;

pub use classify::classify_line;
pub use follower::{LogFollower, DEFAULT_POLL_INTERVAL, EOF_SENTINEL};
