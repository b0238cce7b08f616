//! Gateway frame fixtures
//!
//! Server-to-client frames as the chat platform sends them.

use serde_json::{json, Value};

/// Id of the bot user in READY
pub const BOT_ID: u64 = 123;

/// Credential configured for the bridge under test
pub const TEST_TOKEN: &str = "integration-secret-token";

pub fn hello(heartbeat_interval: u64) -> Value {
    json!({ "op": 10, "d": { "heartbeat_interval": heartbeat_interval } })
}

pub fn ready(seq: u64) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": "READY",
        "d": {
            "v": 10,
            "user": { "id": BOT_ID.to_string(), "username": "discraft", "discriminator": "0", "bot": true },
            "guilds": [],
            "session_id": "integration-session",
            "application": { "id": "999", "flags": 0 }
        }
    })
}

/// MESSAGE_CREATE from a human user mentioning the bot
pub fn mention(seq: u64, channel_id: u64, content: &str) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": "MESSAGE_CREATE",
        "d": {
            "id": (1000 + seq).to_string(),
            "channel_id": channel_id.to_string(),
            "author": { "id": "7", "username": "alex", "discriminator": "0" },
            "content": content,
            "mentions": [{ "id": BOT_ID.to_string(), "username": "discraft", "bot": true }]
        }
    })
}

pub fn heartbeat_request() -> Value {
    json!({ "op": 1, "d": null })
}

pub fn heartbeat_ack() -> Value {
    json!({ "op": 11 })
}

pub fn reconnect() -> Value {
    json!({ "op": 7, "d": null })
}
