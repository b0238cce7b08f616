//! Bridge state machine
//!
//! Pure transitions over the roster and the last announced status. Each
//! transition returns the outbound actions it calls for; performing them is
//! the coordinator's job.

use discraft_core::{strip_self_mentions, Command, Roster, ServerEvent, Snowflake, PING_FAILED_STATUS};
use discraft_gateway::events::MessageCreateEvent;

/// Outbound action decided by a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post `content` to `channel_id`
    Post { channel_id: Snowflake, content: String },
    /// Replace the presence activity
    SetPresence(String),
}

/// Shared bridge state
#[derive(Debug, Clone, Default)]
pub struct BridgeState {
    roster: Roster,
    /// Empty until the first status is computed
    latest_status: String,
    self_id: Option<Snowflake>,
}

impl BridgeState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn latest_status(&self) -> &str {
        &self.latest_status
    }

    pub fn self_id(&self) -> Option<Snowflake> {
        self.self_id
    }

    /// Session identified; a status computed before that is announced now
    pub fn on_ready(&mut self, self_id: Snowflake) -> Vec<Action> {
        if self.self_id.is_some() {
            return Vec::new();
        }
        self.self_id = Some(self_id);

        if self.latest_status.is_empty() {
            Vec::new()
        } else {
            vec![Action::SetPresence(self.latest_status.clone())]
        }
    }

    /// Apply a game server event posting to `channel_id`
    pub fn on_server_event(&mut self, event: &ServerEvent, channel_id: Snowflake) -> Vec<Action> {
        let mut actions: Vec<Action> = event
            .announcement()
            .map(|content| Action::Post { channel_id, content })
            .into_iter()
            .collect();

        let status = match event {
            ServerEvent::Join { user } => {
                self.roster.insert(user.clone());
                self.roster.status_summary()
            }
            ServerEvent::Part { user } => {
                self.roster.remove(user);
                self.roster.status_summary()
            }
            ServerEvent::Roster { players } => {
                self.roster.replace(players.iter().cloned());
                self.roster.status_summary()
            }
            ServerEvent::PingFailed { .. } => PING_FAILED_STATUS.to_string(),
            ServerEvent::Chat { .. } => return actions,
        };

        actions.extend(self.set_status(status));
        actions
    }

    /// Reply to a command addressed to the bot, if `msg` is one
    pub fn on_message(&self, msg: &MessageCreateEvent) -> Option<Action> {
        let self_id = self.self_id?;
        if msg.author.bot || msg.author.id == self_id || !msg.mentions_user(self_id) {
            return None;
        }

        let text = strip_self_mentions(&msg.content, self_id);
        let content = match Command::parse(&text) {
            Some(Command::Ping) => "pong".to_string(),
            Some(Command::List) => self.roster.listing(),
            None => {
                tracing::warn!(
                    message_id = %msg.id,
                    author = %msg.author.username,
                    text = %text,
                    "Mentioned with an unknown command"
                );
                return None;
            }
        };

        Some(Action::Post {
            channel_id: msg.channel_id,
            content,
        })
    }

    /// Forget `status` after its presence update failed, so it is sent again
    pub fn presence_failed(&mut self, status: &str) {
        if self.latest_status == status {
            self.latest_status.clear();
        }
    }

    fn set_status(&mut self, status: String) -> Option<Action> {
        if status == self.latest_status {
            return None;
        }
        self.latest_status.clone_from(&status);

        // Presence can only be sent on an identified session
        self.self_id.map(|_| Action::SetPresence(status))
    }
}
