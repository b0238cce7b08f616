//! Receive loop

use crate::error::{GatewayError, GatewayResult};
use crate::handlers::MessageDispatcher;
use crate::protocol::Envelope;
use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};

/// Read frames until the transport fails or a handler reports a fatal condition
///
/// A frame that fails to decode is logged and skipped.
pub async fn receive_frames<S>(mut stream: S, dispatcher: &MessageDispatcher) -> GatewayResult<()>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        match message.map_err(GatewayError::Read)? {
            Message::Text(text) => match Envelope::decode(&text) {
                Ok(envelope) => {
                    tracing::trace!(op = %envelope.op(), seq = ?envelope.sequence, "Received frame");
                    dispatcher.dispatch(envelope).await?;
                }
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable gateway frame"),
            },
            Message::Binary(data) => {
                tracing::warn!(len = data.len(), "Skipping binary gateway frame");
            }
            Message::Close(frame) => {
                let reason = frame.map(|f| format!("{}: {}", u16::from(f.code), f.reason));
                tracing::warn!(reason = ?reason, "Gateway closed the connection");
                return Err(GatewayError::ConnectionClosed { reason });
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    Err(GatewayError::ConnectionClosed { reason: None })
}
