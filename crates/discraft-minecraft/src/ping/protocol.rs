//! Server List Ping wire format
//!
//! Packets are `VarInt length | VarInt packet id | body`. The status exchange
//! is a handshake with next state 1, an empty status request, and one status
//! response carrying a JSON document.

use crate::error::PingError;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Protocol version sent in the handshake; -1 asks the server for its own
pub const PROTOCOL_VERSION: i32 = -1;

/// Upper bound on a status response packet
pub const MAX_PACKET_LEN: usize = 1 << 20;

const HANDSHAKE_ID: i32 = 0x00;
const STATUS_REQUEST_ID: i32 = 0x00;
const STATUS_RESPONSE_ID: i32 = 0x00;
const NEXT_STATE_STATUS: i32 = 1;

/// Append `value` as a VarInt
pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
}

/// Read one VarInt (at most five bytes)
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, PingError> {
    let mut value: u32 = 0;
    for i in 0..5 {
        let byte = reader.read_u8().await?;
        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(PingError::Protocol("VarInt longer than 5 bytes".to_string()))
}

fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_varint(buf, value.len() as i32);
    buf.extend_from_slice(value.as_bytes());
}

fn frame(packet_id: i32, body: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(body.len() + 5);
    write_varint(&mut packet, packet_id);
    packet.extend_from_slice(body);

    let mut framed = Vec::with_capacity(packet.len() + 5);
    write_varint(&mut framed, packet.len() as i32);
    framed.extend_from_slice(&packet);
    framed
}

/// Handshake packet switching the connection to the status state
#[must_use]
pub fn handshake_packet(host: &str, port: u16) -> Vec<u8> {
    let mut body = Vec::new();
    write_varint(&mut body, PROTOCOL_VERSION);
    write_string(&mut body, host);
    body.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut body, NEXT_STATE_STATUS);
    frame(HANDSHAKE_ID, &body)
}

#[must_use]
pub fn status_request_packet() -> Vec<u8> {
    frame(STATUS_REQUEST_ID, &[])
}

/// Read one status response packet and parse its JSON document
pub async fn read_status_response<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<StatusResponse, PingError> {
    let len = read_length(reader).await?;
    let mut packet = vec![0u8; len];
    reader.read_exact(&mut packet).await?;

    let mut body = packet.as_slice();
    let packet_id = read_varint(&mut body).await?;
    if packet_id != STATUS_RESPONSE_ID {
        return Err(PingError::Protocol(format!(
            "unexpected packet id {packet_id:#04x}"
        )));
    }

    let json_len = read_length(&mut body).await?;
    if json_len > body.len() {
        return Err(PingError::Protocol(format!(
            "status JSON length {json_len} exceeds packet ({} bytes left)",
            body.len()
        )));
    }

    Ok(serde_json::from_slice(&body[..json_len])?)
}

async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<usize, PingError> {
    let len = read_varint(reader).await?;
    usize::try_from(len)
        .ok()
        .filter(|len| *len <= MAX_PACKET_LEN)
        .ok_or_else(|| PingError::Protocol(format!("invalid length {len}")))
}

/// Status document returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub version: Option<Version>,
    pub players: Players,
    #[serde(default)]
    pub description: serde_json::Value,
}

impl StatusResponse {
    /// Sampled player names in lexicographic order
    #[must_use]
    pub fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.players.sample.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub max: u32,
    pub online: u32,
    #[serde(default)]
    pub sample: Vec<PlayerSample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    #[serde(default)]
    pub id: String,
}
