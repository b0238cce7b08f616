//! Domain events emitted by the game-server adapters

mod server_event;

pub use server_event::ServerEvent;
