//! Gateway intents
//!
//! The capability bitmask sent with Identify, declaring which event
//! categories the session wants to receive.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Gateway intent flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        /// Guild create/update/delete, channel create/update/delete
        const GUILDS                   = 1 << 0;
        /// Member add/update/remove
        const GUILD_MEMBERS            = 1 << 1;
        /// Presence updates
        const GUILD_PRESENCES          = 1 << 8;
        /// Message create/update/delete in guild channels
        const GUILD_MESSAGES           = 1 << 9;
        /// Typing start in guild channels
        const GUILD_MESSAGE_TYPING     = 1 << 11;
        /// Message create/update/delete in direct messages
        const DIRECT_MESSAGES          = 1 << 12;
        /// Message content for messages that do not mention the bot
        const MESSAGE_CONTENT          = 1 << 15;

        /// Intents requested when none are configured
        const DEFAULT = Self::GUILD_MESSAGES.bits() | Self::DIRECT_MESSAGES.bits();
    }
}

impl Default for Intents {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Unknown bits are kept so newer intents can be passed through configuration
impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}
