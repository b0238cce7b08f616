//! Hello handler (op 10)
//!
//! The first Hello sends Identify and starts the heartbeat ticker. Every
//! later Hello, concurrent or not, is a no-op.

use super::HeartbeatHandler;
use crate::connection::{Connection, Heartbeat, Session, SessionState};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{HelloPayload, IdentifyPayload};
use std::sync::Arc;

pub struct HelloHandler;

impl HelloHandler {
    pub async fn handle(
        session: &Arc<Session>,
        connection: &Connection,
        identify: &IdentifyPayload,
        hello: &HelloPayload,
    ) -> GatewayResult<()> {
        let interval = hello.interval();
        let mut started = false;
        let fired = &mut started;

        let heartbeat = session
            .start_heartbeat_once(|| async move {
                session.set_state(SessionState::Identifying);
                connection.identify(identify.clone()).await?;
                let task = HeartbeatHandler::spawn(session.clone(), connection.clone(), interval);
                *fired = true;
                Ok::<_, GatewayError>(Heartbeat::new(interval, task.abort_handle()))
            })
            .await?;

        if started {
            tracing::info!(
                heartbeat_interval_ms = heartbeat.interval.as_millis(),
                intents = identify.intents.bits(),
                "Identify sent, heartbeat started"
            );
        } else {
            tracing::debug!(
                heartbeat_interval_ms = interval.as_millis(),
                "Heartbeat already running, ignoring Hello"
            );
        }

        Ok(())
    }
}
