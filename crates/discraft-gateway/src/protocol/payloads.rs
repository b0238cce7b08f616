//! Control payload definitions
//!
//! Payloads of the non-dispatch op codes, in both directions.

use discraft_common::Secret;
use discraft_core::Intents;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }

    /// Heartbeat interval as a `Duration`
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval)
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate the session. `Debug` never shows the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot credential
    #[serde(serialize_with = "expose_secret", deserialize_with = "read_secret")]
    pub token: Secret,

    /// Client connection properties
    pub properties: IdentifyProperties,

    /// Whether the client supports packet compression
    #[serde(default)]
    pub compress: bool,

    /// Event categories the session subscribes to
    pub intents: Intents,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: Secret, intents: Intents) -> Self {
        Self {
            token,
            properties: IdentifyProperties::default(),
            compress: false,
            intents,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = properties;
        self
    }
}

fn expose_secret<S>(secret: &Secret, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose())
}

fn read_secret<'de, D>(deserializer: D) -> Result<Secret, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Secret::new)
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,
    /// Library or client name
    pub browser: String,
    /// Device name
    pub device: String,
}

impl IdentifyProperties {
    #[must_use]
    pub fn new(client: impl Into<String>) -> Self {
        let client = client.into();
        Self {
            os: std::env::consts::OS.to_string(),
            browser: client.clone(),
            device: client,
        }
    }

    /// Set operating system
    #[must_use]
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::new("discraft")
    }
}

/// Activity shown on the bot's presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Activity type (0 = Playing)
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Payload for op 3 (Presence Update)
///
/// Sent by the client to update the bot's status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    /// Unix time in milliseconds when the client went idle, or null
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    /// Always `online` for this client
    pub status: String,
    pub afk: bool,
}

impl PresenceUpdatePayload {
    /// Online presence with a single "Playing" activity
    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            since: None,
            activities: vec![Activity {
                name: name.into(),
                kind: 0,
            }],
            status: "online".to_string(),
            afk: false,
        }
    }
}
