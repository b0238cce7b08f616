//! Log line classification
//!
//! Chat is matched before join/part so a player chatting "x joined the game"
//! is still a chat line.

use discraft_core::ServerEvent;
use regex::Regex;
use std::sync::LazyLock;

const PREFIX: &str = r"\[[0-2][0-9]:[0-6][0-9]:[0-6][0-9]\] \[Server thread/INFO\]: ";

static CHAT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{PREFIX}<([^>]+)> (.*)")).expect("Invalid chat regex"));

static JOIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{PREFIX}(.+) joined the game")).expect("Invalid join regex"));

static PART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{PREFIX}(.+) left the game")).expect("Invalid part regex"));

/// Turn one log line into an event, if it is a chat, join or part line
pub fn classify_line(line: &str) -> Option<ServerEvent> {
    if let Some(caps) = CHAT_PATTERN.captures(line) {
        return Some(ServerEvent::Chat {
            user: caps[1].to_string(),
            text: caps[2].to_string(),
        });
    }
    if let Some(caps) = JOIN_PATTERN.captures(line) {
        return Some(ServerEvent::Join {
            user: caps[1].to_string(),
        });
    }
    PART_PATTERN.captures(line).map(|caps| ServerEvent::Part {
        user: caps[1].to_string(),
    })
}
