//! Player roster
//!
//! The set of players currently connected to the game server.

use std::collections::BTreeSet;

/// Status announced when the status query fails
pub const PING_FAILED_STATUS: &str = "is none because ping failed";

/// Set of unique player names, always iterated in lexicographic order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: BTreeSet<String>,
}

impl Roster {
    /// Create an empty roster
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player. Returns false if already present.
    pub fn insert(&mut self, player: impl Into<String>) -> bool {
        self.players.insert(player.into())
    }

    /// Remove a player. Returns false if the player was not present.
    pub fn remove(&mut self, player: &str) -> bool {
        self.players.remove(player)
    }

    /// Replace the whole roster with a fresh poll result
    pub fn replace<I, S>(&mut self, players: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = players.into_iter().map(Into::into).collect();
    }

    /// Check if a player is present
    #[must_use]
    pub fn contains(&self, player: &str) -> bool {
        self.players.contains(player)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in lexicographic order
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(String::as_str)
    }

    /// Presence status summary derived from the roster size
    #[must_use]
    pub fn status_summary(&self) -> String {
        if self.players.is_empty() {
            "is none".to_string()
        } else {
            format!("is {} players", self.players.len())
        }
    }

    /// Human readable, sorted player listing
    #[must_use]
    pub fn listing(&self) -> String {
        if self.players.is_empty() {
            "No players online".to_string()
        } else {
            format!("Online players: {}", self.players().collect::<Vec<_>>().join(", "))
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Roster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().map(Into::into).collect(),
        }
    }
}
