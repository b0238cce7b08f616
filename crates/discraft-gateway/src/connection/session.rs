//! Session state
//!
//! Tracks the handshake state, the last seen sequence number, the heartbeat
//! interval and the authenticated identity of the single gateway session.

use discraft_core::Snowflake;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::AbortHandle;

/// Handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Connected, waiting for op 10 Hello
    AwaitingHello,
    /// Identify sent, waiting for the READY dispatch
    Identifying,
    /// READY received
    Ready,
}

/// A running heartbeat ticker
#[derive(Debug)]
pub struct Heartbeat {
    pub interval: Duration,
    task: AbortHandle,
}

impl Heartbeat {
    #[must_use]
    pub fn new(interval: Duration, task: AbortHandle) -> Self {
        Self { interval, task }
    }
}

/// State of one gateway session
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,

    /// Last seen sequence number, 0 until the first dispatch
    sequence: AtomicU64,

    /// Single-fire latch for Identify + heartbeat start
    heartbeat: OnceCell<Heartbeat>,

    /// Bot user id from READY
    self_id: OnceLock<Snowflake>,

    /// Session id from READY
    session_id: OnceLock<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::AwaitingHello),
            sequence: AtomicU64::new(0),
            heartbeat: OnceCell::new(),
            self_id: OnceLock::new(),
            session_id: OnceLock::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: SessionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            tracing::info!(from = ?previous, to = ?state, "Session state changed");
        }
    }

    /// Record a sequence number; the stored value never decreases
    pub fn observe_sequence(&self, seq: u64) {
        self.sequence.fetch_max(seq, Ordering::SeqCst);
    }

    /// Last seen sequence number, if any dispatch arrived yet
    pub fn last_sequence(&self) -> Option<u64> {
        match self.sequence.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }

    /// Run `init` exactly once for the session's lifetime
    ///
    /// Concurrent callers wait for the first one to finish. If `init` fails the
    /// latch stays open and the error is returned to that caller.
    pub async fn start_heartbeat_once<F, Fut, E>(&self, init: F) -> Result<&Heartbeat, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Heartbeat, E>>,
    {
        self.heartbeat.get_or_try_init(init).await
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat.get().map(|hb| hb.interval)
    }

    pub fn is_heartbeating(&self) -> bool {
        self.heartbeat.initialized()
    }

    /// Stop the heartbeat ticker, if one was started
    pub fn stop_heartbeat(&self) {
        if let Some(hb) = self.heartbeat.get() {
            hb.task.abort();
        }
    }

    /// Record the READY identity; later calls keep the first value
    pub fn mark_ready(&self, self_id: Snowflake, session_id: impl Into<String>) {
        if self.self_id.set(self_id).is_err() {
            tracing::warn!(user_id = %self_id, "Duplicate READY ignored");
            return;
        }
        let _ = self.session_id.set(session_id.into());
        self.set_state(SessionState::Ready);
    }

    pub fn self_id(&self) -> Option<Snowflake> {
        self.self_id.get().copied()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }
}
