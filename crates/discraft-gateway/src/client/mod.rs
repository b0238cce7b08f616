//! Gateway client
//!
//! Opens the WebSocket, then runs the receive loop and the writer task until
//! either one fails.

mod receive;

pub use receive::receive_frames;

use crate::connection::{write_frames, Connection, Session, OUTBOUND_BUFFER_SIZE};
use crate::error::{GatewayError, GatewayResult};
use crate::events::DispatchEvent;
use crate::handlers::MessageDispatcher;
use crate::protocol::{IdentifyPayload, IdentifyProperties};
use discraft_common::Secret;
use discraft_core::Intents;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

/// Gateway protocol version requested on connect
pub const GATEWAY_VERSION: &str = "10";

/// Identify parameters
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub token: Secret,
    pub intents: Intents,
    pub properties: IdentifyProperties,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(token: Secret, intents: Intents) -> Self {
        Self {
            token,
            intents,
            properties: IdentifyProperties::default(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = properties;
        self
    }

    fn identify_payload(&self) -> IdentifyPayload {
        IdentifyPayload::new(self.token.clone(), self.intents).with_properties(self.properties.clone())
    }
}

/// Build the connect URL from a discovered gateway address
///
/// Any existing query is replaced with `v=10&encoding=json`.
pub fn gateway_url(base: &str) -> GatewayResult<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("v", GATEWAY_VERSION)
        .append_pair("encoding", "json");
    Ok(url)
}

/// One connected gateway session
pub struct GatewayClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    config: GatewayConfig,
    session: Arc<Session>,
    connection: Connection,
    frames: mpsc::Receiver<String>,
}

impl GatewayClient {
    /// Open the transport; no retry
    pub async fn connect(url: &Url, config: GatewayConfig) -> GatewayResult<Self> {
        let (stream, response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(GatewayError::Connect)?;

        tracing::info!(url = %url, status = %response.status(), "Connected to gateway");

        let (connection, frames) = Connection::channel(OUTBOUND_BUFFER_SIZE);
        Ok(Self {
            stream,
            config,
            session: Arc::new(Session::new()),
            connection,
            frames,
        })
    }

    /// Handle for sending presence updates and other commands
    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }

    pub fn session(&self) -> Arc<Session> {
        self.session.clone()
    }

    /// Run the session, forwarding dispatch events to `events`
    ///
    /// Returns only on a fatal condition.
    pub async fn run(self, events: mpsc::Sender<DispatchEvent>) -> GatewayResult<()> {
        let Self {
            stream,
            config,
            session,
            connection,
            frames,
        } = self;

        let (sink, stream) = stream.split();
        let dispatcher =
            MessageDispatcher::new(session.clone(), connection, config.identify_payload(), events);
        let mut writer = tokio::spawn(write_frames(sink, frames));

        let result = tokio::select! {
            result = receive_frames(stream, &dispatcher) => result,
            joined = &mut writer => match joined {
                Ok(Ok(())) => Err(GatewayError::WriterClosed),
                Ok(Err(e)) => Err(e),
                Err(e) => {
                    tracing::error!(error = %e, "Gateway writer task failed");
                    Err(GatewayError::WriterClosed)
                }
            },
        };

        session.stop_heartbeat();
        writer.abort();

        if let Err(e) = &result {
            tracing::info!(
                error = %e,
                state = ?session.state(),
                session_id = session.session_id().unwrap_or("-"),
                "Gateway session ended"
            );
        }
        result
    }
}
