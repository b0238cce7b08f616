//! Test helpers for integration tests
//!
//! Mock REST API (axum), mock gateway (tokio-tungstenite) and a mock game
//! server answering status pings, all bound to ephemeral local ports.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use discraft_common::AppConfig;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::fixtures::TEST_TOKEN;

/// Upper bound for any single expected event
pub const WAIT: Duration = Duration::from_secs(5);

/// A message creation the mock API accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub channel_id: String,
    pub content: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct ApiState {
    gateway_url: Mutex<String>,
    posts: Mutex<Vec<RecordedPost>>,
    post_attempts: AtomicUsize,
    throttle_next: AtomicUsize,
    fail_next: Mutex<Option<StatusCode>>,
    exhaust_next: Mutex<Option<Duration>>,
}

fn rate_limit_headers(remaining: u64, reset_in: Duration) -> [(&'static str, String); 2] {
    let reset = chrono::Utc::now() + chrono::Duration::from_std(reset_in).unwrap();
    [
        ("x-ratelimit-remaining", remaining.to_string()),
        (
            "x-ratelimit-reset",
            format!("{:.3}", reset.timestamp_millis() as f64 / 1000.0),
        ),
    ]
}

async fn gateway_bot(State(state): State<Arc<ApiState>>) -> Response {
    let url = state.gateway_url.lock().unwrap().clone();
    (
        rate_limit_headers(5, Duration::from_secs(1)),
        Json(json!({ "url": url, "shards": 1 })),
    )
        .into_response()
}

async fn create_message(
    State(state): State<Arc<ApiState>>,
    UrlPath(channel_id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.post_attempts.fetch_add(1, Ordering::SeqCst);

    let throttled = state
        .throttle_next
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if throttled {
        let [remaining, reset] = rate_limit_headers(0, Duration::from_millis(200));
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [remaining, reset, ("retry-after", "0.2".to_string())],
            Json(json!({ "message": "You are being rate limited.", "retry_after": 0.2, "global": false })),
        )
            .into_response();
    }

    let failure = state.fail_next.lock().unwrap().take();
    if let Some(status) = failure {
        return (
            status,
            rate_limit_headers(5, Duration::from_secs(1)),
            Json(json!({ "message": "Missing Access", "code": 50001 })),
        )
            .into_response();
    }

    let content = body["content"].as_str().unwrap_or_default().to_string();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let id = {
        let mut posts = state.posts.lock().unwrap();
        posts.push(RecordedPost {
            channel_id: channel_id.clone(),
            content: content.clone(),
            authorization,
        });
        posts.len()
    };

    let limit = match state.exhaust_next.lock().unwrap().take() {
        Some(reset_in) => rate_limit_headers(0, reset_in),
        None => rate_limit_headers(5, Duration::from_secs(1)),
    };
    (
        limit,
        Json(json!({ "id": id.to_string(), "channel_id": channel_id, "content": content })),
    )
        .into_response()
}

/// Mock REST API
pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<ApiState>,
    _handle: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(ApiState::default());
        let app = Router::new()
            .route("/api/v10/gateway/bot", get(gateway_bot))
            .route("/api/v10/channels/:channel_id/messages", post(create_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v10", self.addr)
    }

    /// Gateway address returned by `GET /gateway/bot`
    pub fn set_gateway_url(&self, url: impl Into<String>) {
        *self.state.gateway_url.lock().unwrap() = url.into();
    }

    /// Answer the next `n` message posts with 429
    pub fn throttle_next(&self, n: usize) {
        self.state.throttle_next.store(n, Ordering::SeqCst);
    }

    /// Answer the next message post with `status`
    pub fn fail_next(&self, status: StatusCode) {
        *self.state.fail_next.lock().unwrap() = Some(status);
    }

    /// Report the message bucket as exhausted for `reset_in` after the next post
    pub fn exhaust_next(&self, reset_in: Duration) {
        *self.state.exhaust_next.lock().unwrap() = Some(reset_in);
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.state.posts.lock().unwrap().clone()
    }

    pub fn post_attempts(&self) -> usize {
        self.state.post_attempts.load(Ordering::SeqCst)
    }

    /// Wait until a post with `content` has been accepted
    pub async fn wait_for_post(&self, content: &str) -> Result<RecordedPost> {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            if let Some(post) = self.posts().into_iter().find(|p| p.content == content) {
                return Ok(post);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("no post {content:?} within {WAIT:?}, got {:?}", self.posts());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Mock gateway accepting WebSocket sessions
pub struct MockGateway {
    listener: TcpListener,
    pub addr: SocketAddr,
}

impl MockGateway {
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub async fn accept(&self) -> Result<GatewayPeer> {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .context("no gateway connection")??;
        let ws = tokio_tungstenite::accept_async(stream).await?;
        Ok(GatewayPeer { ws })
    }
}

/// Server side of one gateway session
pub struct GatewayPeer {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayPeer {
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Next text frame sent by the client
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let message = tokio::time::timeout(WAIT, self.ws.next())
                .await
                .context("timed out waiting for a client frame")?
                .context("client closed the stream")??;
            match message {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => bail!("client closed the session: {frame:?}"),
                _ => {}
            }
        }
    }

    /// Skip frames until one with `op` arrives
    pub async fn next_op(&mut self, op: u64) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Skip presence updates until one shows `activity`
    pub async fn wait_for_presence(&mut self, activity: &str) -> Result<Value> {
        loop {
            let frame = self.next_op(3).await?;
            if frame["d"]["activities"][0]["name"] == activity {
                return Ok(frame);
            }
        }
    }
}

/// Mock game server answering status pings with a fixed player sample
pub async fn spawn_status_server(players: &[&str]) -> Result<(SocketAddr, JoinHandle<()>)> {
    let sample: Vec<Value> = players
        .iter()
        .map(|name| json!({ "name": name, "id": "00000000-0000-0000-0000-000000000000" }))
        .collect();
    let document = json!({
        "version": { "name": "1.20.4", "protocol": 765 },
        "players": { "max": 20, "online": players.len(), "sample": sample },
        "description": { "text": "integration" }
    })
    .to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0u8; 512];
            if stream.read(&mut request).await.is_err() {
                continue;
            }
            let _ = stream.write_all(&status_packet(&document)).await;
        }
    });
    Ok((addr, handle))
}

fn varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
}

fn status_packet(document: &str) -> Vec<u8> {
    let mut packet = vec![0x00];
    varint(&mut packet, document.len() as u32);
    packet.extend_from_slice(document.as_bytes());

    let mut framed = Vec::new();
    varint(&mut framed, packet.len() as u32);
    framed.extend_from_slice(&packet);
    framed
}

/// A local port nothing listens on
pub async fn closed_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

/// Bridge configuration pointing at the mocks
pub fn bridge_config(api: &MockApi, channel_id: u64, log_path: &Path, game_addr: SocketAddr) -> Result<AppConfig> {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DISCRAFT_TOKEN", TEST_TOKEN.to_string()),
        ("DISCRAFT_CHANNEL_ID", channel_id.to_string()),
        ("DISCRAFT_API_BASE", api.base_url()),
        ("DISCRAFT_MC_LOG", log_path.display().to_string()),
        ("DISCRAFT_MC_HOST", game_addr.ip().to_string()),
        ("DISCRAFT_MC_PORT", game_addr.port().to_string()),
        ("DISCRAFT_POLL_INTERVAL_SECS", "60".to_string()),
        ("DISCRAFT_PING_TIMEOUT_SECS", "2".to_string()),
    ]);
    Ok(AppConfig::from_lookup(|key| vars.get(key).cloned())?)
}
