//! Domain entities

mod command;
mod roster;

pub use command::{strip_self_mentions, Command};
pub use roster::{Roster, PING_FAILED_STATUS};
