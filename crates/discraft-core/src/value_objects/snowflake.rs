//! Snowflake: the chat platform's 64-bit id, serialized as a decimal string

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// The user mention forms the platform renders for this id: `<@id>` and `<@!id>`
    pub fn mention_forms(&self) -> [String; 2] {
        [format!("<@{}>", self.0), format!("<@!{}>", self.0)]
    }

    /// Parse a decimal id, ignoring surrounding whitespace
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| SnowflakeParseError::InvalidFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake {0:?}")]
    InvalidFormat(String),
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ids arrive as strings, but integers are accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSnowflake::deserialize(deserializer)? {
            RawSnowflake::Number(id) => Ok(Self(id)),
            RawSnowflake::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
