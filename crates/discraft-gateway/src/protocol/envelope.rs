//! Typed gateway envelope
//!
//! An `Envelope` is a frame whose payload has been decoded into the one type
//! determined by its (op, t) pair. Unrecognized pairs are rejected.

use super::{GatewayMessage, HelloPayload, IdentifyPayload, OpCode, PresenceUpdatePayload};
use crate::error::DecodeError;
use crate::events::{DispatchEvent, GatewayEventType};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Decoded payload, one variant per recognized op code
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// op 0 with a recognized event type
    Dispatch(DispatchEvent),
    /// op 1, carrying the last sequence number known to the sender
    Heartbeat(Option<u64>),
    /// op 2
    Identify(IdentifyPayload),
    /// op 3
    PresenceUpdate(PresenceUpdatePayload),
    /// op 7
    Reconnect,
    /// op 9
    InvalidSession { resumable: bool },
    /// op 10
    Hello(HelloPayload),
    /// op 11
    HeartbeatAck,
}

impl Payload {
    #[must_use]
    pub fn op(&self) -> OpCode {
        match self {
            Self::Dispatch(_) => OpCode::Dispatch,
            Self::Heartbeat(_) => OpCode::Heartbeat,
            Self::Identify(_) => OpCode::Identify,
            Self::PresenceUpdate(_) => OpCode::PresenceUpdate,
            Self::Reconnect => OpCode::Reconnect,
            Self::InvalidSession { .. } => OpCode::InvalidSession,
            Self::Hello(_) => OpCode::Hello,
            Self::HeartbeatAck => OpCode::HeartbeatAck,
        }
    }
}

/// A decoded inbound or outbound gateway frame
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Sequence number (`s`), present on dispatch frames
    pub sequence: Option<u64>,
    pub payload: Payload,
}

/// Wire frame with the op code kept raw so unknown values get a precise error
#[derive(Deserialize)]
struct RawFrame {
    op: u64,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

impl Envelope {
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self {
            sequence: None,
            payload,
        }
    }

    #[must_use]
    pub fn dispatch(sequence: u64, event: DispatchEvent) -> Self {
        Self {
            sequence: Some(sequence),
            payload: Payload::Dispatch(event),
        }
    }

    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::new(Payload::Heartbeat(last_sequence))
    }

    #[must_use]
    pub fn identify(payload: IdentifyPayload) -> Self {
        Self::new(Payload::Identify(payload))
    }

    #[must_use]
    pub fn presence_update(payload: PresenceUpdatePayload) -> Self {
        Self::new(Payload::PresenceUpdate(payload))
    }

    #[must_use]
    pub fn op(&self) -> OpCode {
        self.payload.op()
    }

    /// Event type tag (`t`), present only on dispatch frames
    #[must_use]
    pub fn event_type(&self) -> Option<GatewayEventType> {
        match &self.payload {
            Payload::Dispatch(event) => Some(event.event_type()),
            _ => None,
        }
    }

    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let raw: RawFrame = serde_json::from_str(text).map_err(DecodeError::Json)?;
        let op = u8::try_from(raw.op)
            .ok()
            .and_then(OpCode::from_u8)
            .ok_or(DecodeError::UnknownOpcode(raw.op))?;

        let payload = match op {
            OpCode::Dispatch => {
                let name = raw.t.ok_or(DecodeError::MissingEventType)?;
                let event_type = GatewayEventType::from_str(&name)
                    .ok_or_else(|| DecodeError::UnknownEventType(name.clone()))?;
                if raw.d.is_null() {
                    return Err(DecodeError::MissingPayload(op));
                }
                let event = DispatchEvent::from_value(event_type, raw.d).map_err(|source| {
                    DecodeError::InvalidPayload {
                        op,
                        event: Some(name),
                        source,
                    }
                })?;
                Payload::Dispatch(event)
            }
            OpCode::Heartbeat => Payload::Heartbeat(
                serde_json::from_value(raw.d)
                    .map_err(|source| DecodeError::InvalidPayload { op, event: None, source })?,
            ),
            OpCode::Identify => Payload::Identify(required(op, raw.d)?),
            OpCode::PresenceUpdate => Payload::PresenceUpdate(required(op, raw.d)?),
            OpCode::Reconnect => Payload::Reconnect,
            OpCode::InvalidSession => Payload::InvalidSession {
                resumable: raw.d.as_bool().unwrap_or(false),
            },
            OpCode::Hello => Payload::Hello(required(op, raw.d)?),
            OpCode::HeartbeatAck => Payload::HeartbeatAck,
        };

        Ok(Self {
            sequence: raw.s,
            payload,
        })
    }

    /// Convert to the untyped wire frame
    pub fn to_message(&self) -> Result<GatewayMessage, serde_json::Error> {
        let d = match &self.payload {
            Payload::Dispatch(event) => event.to_value()?,
            Payload::Heartbeat(seq) => serde_json::to_value(seq)?,
            Payload::Identify(p) => serde_json::to_value(p)?,
            Payload::PresenceUpdate(p) => serde_json::to_value(p)?,
            Payload::Reconnect | Payload::HeartbeatAck => Value::Null,
            Payload::InvalidSession { resumable } => Value::Bool(*resumable),
            Payload::Hello(p) => serde_json::to_value(p)?,
        };

        Ok(GatewayMessage {
            op: self.op(),
            t: self.event_type().map(|t| t.as_str().to_string()),
            s: self.sequence,
            d,
        })
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.to_message()?.to_json()
    }
}

fn required<T: DeserializeOwned>(op: OpCode, d: Value) -> Result<T, DecodeError> {
    if d.is_null() {
        return Err(DecodeError::MissingPayload(op));
    }
    serde_json::from_value(d).map_err(|source| DecodeError::InvalidPayload {
        op,
        event: None,
        source,
    })
}
