//! Heartbeat ticker (op 1)

use crate::connection::{Connection, Session};
use crate::error::GatewayResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Sends heartbeats on the interval announced by Hello
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Spawn the ticker; the first heartbeat goes out one interval from now
    pub fn spawn(session: Arc<Session>, connection: Connection, period: Duration) -> JoinHandle<()> {
        tokio::spawn(Self::run(session, connection, period))
    }

    async fn run(session: Arc<Session>, connection: Connection, period: Duration) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let seq = session.last_sequence();
            if let Err(e) = connection.heartbeat(seq).await {
                tracing::warn!(error = %e, "Heartbeat ticker stopped");
                break;
            }
            tracing::trace!(seq = ?seq, "Heartbeat sent");
        }
    }

    /// Answer a server-sent heartbeat request right away
    pub async fn handle_request(session: &Session, connection: &Connection) -> GatewayResult<()> {
        tracing::debug!("Gateway requested an immediate heartbeat");
        connection.heartbeat(session.last_sequence()).await
    }
}
