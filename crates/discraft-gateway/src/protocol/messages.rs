//! Untyped wire frame
//!
//! `{op, d, s?, t?}`; decoding into typed payloads happens in
//! [`Envelope::decode`](super::Envelope::decode).

use super::OpCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: OpCode,

    /// Dispatch event name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Dispatch sequence number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    #[serde(default)]
    pub d: Value,
}

impl GatewayMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op={}", self.op)?;
        if let Some(t) = &self.t {
            write!(f, " t={t}")?;
        }
        if let Some(s) = self.s {
            write!(f, " s={s}")?;
        }
        Ok(())
    }
}
