//! Chat command vocabulary
//!
//! Commands are addressed to the bot by mentioning it.

use crate::value_objects::Snowflake;

/// Commands understood when the bot is mentioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Acknowledgement check, answered with `pong`
    Ping,
    /// Roster query, answered with the sorted player listing
    List,
}

impl Command {
    /// Parse already stripped, trimmed and lowercased text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "ping" => Some(Self::Ping),
            "list" | "players" => Some(Self::List),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::List => "list",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Remove every self-mention form from `content`, then trim and lowercase it
#[must_use]
pub fn strip_self_mentions(content: &str, self_id: Snowflake) -> String {
    let mut stripped = content.to_string();
    for form in self_id.mention_forms() {
        stripped = stripped.replace(&form, "");
    }
    stripped.trim().to_lowercase()
}
