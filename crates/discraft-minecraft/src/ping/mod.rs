//! Game server status adapter

mod poller;
mod protocol;

pub use poller::{ServerListPing, StatusPoller, StatusQuery};
pub use protocol::{
    handshake_packet, read_status_response, read_varint, status_request_packet, write_varint,
    PlayerSample, Players, StatusResponse, Version,
};
