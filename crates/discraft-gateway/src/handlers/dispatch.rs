//! Envelope routing
//!
//! One envelope at a time, in arrival order.

use super::{HeartbeatHandler, HelloHandler};
use crate::connection::{Connection, Session};
use crate::error::{GatewayError, GatewayResult};
use crate::events::DispatchEvent;
use crate::protocol::{Envelope, IdentifyPayload, Payload};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Routes inbound envelopes to their handler
pub struct MessageDispatcher {
    session: Arc<Session>,
    connection: Connection,
    identify: IdentifyPayload,
    events: mpsc::Sender<DispatchEvent>,
}

impl MessageDispatcher {
    #[must_use]
    pub fn new(
        session: Arc<Session>,
        connection: Connection,
        identify: IdentifyPayload,
        events: mpsc::Sender<DispatchEvent>,
    ) -> Self {
        Self {
            session,
            connection,
            identify,
            events,
        }
    }

    /// Handle one envelope; an `Err` ends the session
    pub async fn dispatch(&self, envelope: Envelope) -> GatewayResult<()> {
        let op = envelope.op();
        if op.ends_session() {
            tracing::debug!(op = %op, last_sequence = ?self.session.last_sequence(), "Session ending");
        }

        match envelope.payload {
            Payload::Hello(hello) => {
                HelloHandler::handle(&self.session, &self.connection, &self.identify, &hello).await
            }
            Payload::Dispatch(event) => {
                if let Some(seq) = envelope.sequence {
                    self.session.observe_sequence(seq);
                }
                self.forward(event).await
            }
            Payload::Heartbeat(_) => {
                HeartbeatHandler::handle_request(&self.session, &self.connection).await
            }
            Payload::HeartbeatAck => {
                tracing::debug!("Heartbeat acknowledged");
                Ok(())
            }
            Payload::Reconnect => {
                tracing::warn!("Gateway requested reconnect, ending session");
                Err(GatewayError::ReconnectRequested)
            }
            Payload::InvalidSession { resumable } => {
                tracing::warn!(resumable, "Gateway invalidated the session");
                Err(GatewayError::InvalidSession { resumable })
            }
            Payload::Identify(_) | Payload::PresenceUpdate(_) => {
                tracing::warn!(op = %op, "Ignoring client-only op code from gateway");
                Ok(())
            }
        }
    }

    async fn forward(&self, event: DispatchEvent) -> GatewayResult<()> {
        match &event {
            DispatchEvent::Ready(ready) => {
                self.session.mark_ready(ready.user.id, ready.session_id.clone());
                tracing::info!(
                    user_id = %ready.user.id,
                    username = %ready.user.username,
                    guilds = ready.guilds.len(),
                    "Gateway session ready"
                );
            }
            DispatchEvent::MessageCreate(msg) => {
                tracing::debug!(message_id = %msg.id, channel_id = %msg.channel_id, "Message received");
            }
            DispatchEvent::ChannelCreate(channel) => {
                tracing::debug!(channel_id = %channel.id, "Channel created");
            }
        }

        self.events
            .send(event)
            .await
            .map_err(|_| GatewayError::EventsClosed)
    }
}
