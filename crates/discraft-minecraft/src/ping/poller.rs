//! Periodic status polling
//!
//! One query per tick, the first one immediately. A successful query yields
//! [`ServerEvent::Roster`]; a failed one yields [`ServerEvent::PingFailed`].

use super::protocol::{handshake_packet, read_status_response, status_request_packet, StatusResponse};
use crate::error::PingError;
use async_trait::async_trait;
use discraft_core::ServerEvent;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Something that can report the server status
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn query(&self) -> Result<StatusResponse, PingError>;
}

/// Server List Ping over TCP
#[derive(Debug, Clone)]
pub struct ServerListPing {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ServerListPing {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn exchange(&self) -> Result<StatusResponse, PingError> {
        let address = self.address();
        let mut stream = TcpStream::connect(&address)
            .await
            .map_err(|source| PingError::Connect { address, source })?;

        stream.write_all(&handshake_packet(&self.host, self.port)).await?;
        stream.write_all(&status_request_packet()).await?;
        stream.flush().await?;

        read_status_response(&mut stream).await
    }
}

#[async_trait]
impl StatusQuery for ServerListPing {
    async fn query(&self) -> Result<StatusResponse, PingError> {
        tokio::time::timeout(self.timeout, self.exchange())
            .await
            .map_err(|_| PingError::Timeout(self.timeout))?
    }
}

/// Runs a [`StatusQuery`] on a fixed interval
pub struct StatusPoller<Q> {
    query: Q,
    interval: Duration,
}

impl<Q: StatusQuery> StatusPoller<Q> {
    #[must_use]
    pub fn new(query: Q, interval: Duration) -> Self {
        Self { query, interval }
    }

    /// Poll until cancelled or the receiver is dropped
    ///
    /// Cancellation also aborts a query that is in flight.
    pub async fn run(self, events: mpsc::Sender<ServerEvent>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.query.query() => result,
            };

            let event = match result {
                Ok(status) => {
                    let players = status.player_names();
                    tracing::debug!(online = status.players.online, sampled = players.len(), "Status query succeeded");
                    ServerEvent::Roster { players }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Status query failed");
                    ServerEvent::PingFailed { reason: e.to_string() }
                }
            };

            let sent = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                sent = events.send(event) => sent,
            };
            if sent.is_err() {
                tracing::debug!("Status event receiver dropped");
                break;
            }
        }

        tracing::debug!("Status poller stopped");
    }
}
