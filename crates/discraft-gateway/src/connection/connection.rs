//! Outbound side of the gateway connection
//!
//! `Connection` is a cloneable handle that serializes envelopes onto a bounded
//! channel. A single writer task drains that channel into the WebSocket sink.

use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{Envelope, IdentifyPayload, OpCode, PresenceUpdatePayload};
use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

/// Channel buffer size for outgoing frames
pub const OUTBOUND_BUFFER_SIZE: usize = 100;

/// Handle for sending envelopes to the gateway
#[derive(Debug, Clone)]
pub struct Connection {
    sender: mpsc::Sender<String>,
}

impl Connection {
    /// Create a handle and the receiver the writer task drains
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }

    /// Serialize and queue one envelope
    pub async fn send(&self, envelope: &Envelope) -> GatewayResult<()> {
        let json = envelope.to_json()?;

        match envelope.op() {
            OpCode::Identify => tracing::debug!(op = %OpCode::Identify, "Sending Identify (credential redacted)"),
            OpCode::Heartbeat => tracing::trace!(frame = %json, "Sending heartbeat"),
            op => tracing::debug!(op = %op, frame = %json, "Sending frame"),
        }

        self.sender
            .send(json)
            .await
            .map_err(|_| GatewayError::WriterClosed)
    }

    /// Send op 1 with the last seen sequence number
    pub async fn heartbeat(&self, last_sequence: Option<u64>) -> GatewayResult<()> {
        self.send(&Envelope::heartbeat(last_sequence)).await
    }

    /// Send op 2
    pub async fn identify(&self, payload: IdentifyPayload) -> GatewayResult<()> {
        self.send(&Envelope::identify(payload)).await
    }

    /// Send op 3 with an online "Playing <name>" activity
    pub async fn update_presence(&self, activity: impl Into<String>) -> GatewayResult<()> {
        let activity = activity.into();
        tracing::info!(activity = %activity, "Updating presence");
        self.send(&Envelope::presence_update(PresenceUpdatePayload::playing(activity)))
            .await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Drain queued frames into `sink` until every `Connection` is dropped
///
/// A write failure is fatal for the session.
pub async fn write_frames<S>(mut sink: S, mut frames: mpsc::Receiver<String>) -> GatewayResult<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(frame) = frames.recv().await {
        sink.send(Message::Text(frame)).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to write gateway frame");
            GatewayError::Write(e)
        })?;
    }

    tracing::debug!("Outbound channel closed, closing gateway sink");
    let _ = sink.close().await;
    Ok(())
}
