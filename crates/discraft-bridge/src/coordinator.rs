//! Bridge coordinator
//!
//! Consumes the gateway and game server event streams, runs each event
//! through [`BridgeState`] and performs the resulting actions. The state lock
//! is released before any action is sent.

use crate::sinks::{MessageSink, PresenceSink};
use crate::state::{Action, BridgeState};
use discraft_core::{ServerEvent, Snowflake};
use discraft_gateway::DispatchEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Routes events between the two sides of the bridge
pub struct Coordinator<M, P> {
    channel_id: Snowflake,
    state: Mutex<BridgeState>,
    messages: M,
    presence: P,
}

impl<M: MessageSink, P: PresenceSink> Coordinator<M, P> {
    /// Announce game server events to `channel_id`
    pub fn new(channel_id: Snowflake, messages: M, presence: P) -> Self {
        Self {
            channel_id,
            state: Mutex::new(BridgeState::new()),
            messages,
            presence,
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> BridgeState {
        self.state.lock().clone()
    }

    pub async fn handle_dispatch(&self, event: DispatchEvent) {
        let actions = {
            let mut state = self.state.lock();
            match &event {
                DispatchEvent::Ready(ready) => {
                    tracing::info!(
                        user_id = %ready.user.id,
                        username = %ready.user.username,
                        "Bridge session ready"
                    );
                    state.on_ready(ready.user.id)
                }
                DispatchEvent::MessageCreate(msg) => state.on_message(msg).into_iter().collect(),
                DispatchEvent::ChannelCreate(channel) => {
                    tracing::debug!(channel_id = %channel.id, "Channel created");
                    Vec::new()
                }
            }
        };
        self.perform(actions).await;
    }

    pub async fn handle_server_event(&self, event: ServerEvent) {
        let actions = self.state.lock().on_server_event(&event, self.channel_id);
        self.perform(actions).await;
    }

    /// Failed actions are logged; the next event is processed regardless
    async fn perform(&self, actions: Vec<Action>) {
        for action in actions {
            let result = match &action {
                Action::Post { channel_id, content } => {
                    self.messages.post(*channel_id, content).await
                }
                Action::SetPresence(activity) => self.presence.set_activity(activity).await,
            };

            if let Err(e) = result {
                tracing::error!(error = %e, action = ?action, "Bridge action failed");
                if let Action::SetPresence(activity) = &action {
                    self.state.lock().presence_failed(activity);
                }
            }
        }
    }

    /// Process both streams until both are closed
    pub async fn run(
        &self,
        mut gateway_events: mpsc::Receiver<DispatchEvent>,
        mut server_events: mpsc::Receiver<ServerEvent>,
    ) {
        let mut gateway_open = true;
        let mut server_open = true;

        while gateway_open || server_open {
            tokio::select! {
                event = gateway_events.recv(), if gateway_open => match event {
                    Some(event) => self.handle_dispatch(event).await,
                    None => {
                        tracing::debug!("Gateway event stream closed");
                        gateway_open = false;
                    }
                },
                event = server_events.recv(), if server_open => match event {
                    Some(event) => self.handle_server_event(event).await,
                    None => {
                        tracing::debug!("Game server event stream closed");
                        server_open = false;
                    }
                },
            }
        }

        tracing::info!("Bridge coordinator stopped");
    }
}
