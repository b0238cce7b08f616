//! Gateway session and full bridge tests against the mock servers
//!
//! Run with: cargo test -p integration-tests --test bridge_tests

use std::io::Write;
use std::net::SocketAddr;

use discraft_common::{AppError, Secret, EXIT_FAILURE, EXIT_OK};
use discraft_core::{Intents, PING_FAILED_STATUS};
use discraft_gateway::{gateway_url, DispatchEvent, GatewayClient, GatewayConfig};
use integration_tests::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

async fn connect(gateway: &MockGateway) -> (GatewayClient, GatewayPeer) {
    let url = gateway_url(&gateway.url()).unwrap();
    let config = GatewayConfig::new(Secret::new(TEST_TOKEN), Intents::DEFAULT);
    let (client, peer) = tokio::join!(GatewayClient::connect(&url, config), gateway.accept());
    (client.unwrap(), peer.unwrap())
}

fn append(path: &std::path::Path, line: &str) {
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    writeln!(file, "{line}").unwrap();
}

// ============================================================================
// Gateway Session Tests
// ============================================================================

#[tokio::test]
async fn test_handshake_and_heartbeat_reply() {
    let gateway = MockGateway::bind().await.unwrap();
    let (client, mut peer) = connect(&gateway).await;
    let (events_tx, mut events_rx) = mpsc::channel(8);
    let session = tokio::spawn(client.run(events_tx));

    peer.send(hello(45_000)).await.unwrap();
    let identify = peer.next_op(2).await.unwrap();
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert_eq!(identify["d"]["intents"], Intents::DEFAULT.bits());

    peer.send(ready(1)).await.unwrap();
    let event = tokio::time::timeout(WAIT, events_rx.recv()).await.unwrap().unwrap();
    assert!(matches!(event, DispatchEvent::Ready(ready) if ready.user.id.into_inner() == BOT_ID));

    // A server-requested heartbeat is answered at once with the last sequence
    peer.send(heartbeat_request()).await.unwrap();
    let beat = peer.next_frame().await.unwrap();
    assert_eq!(beat["op"], 1);
    assert_eq!(beat["d"], 1);
    peer.send(heartbeat_ack()).await.unwrap();

    peer.send(reconnect()).await.unwrap();
    let err = tokio::time::timeout(WAIT, session).await.unwrap().unwrap().unwrap_err();
    assert!(err.is_reconnect_request());
}

#[tokio::test]
async fn test_repeated_hello_identifies_once() {
    let gateway = MockGateway::bind().await.unwrap();
    let (client, mut peer) = connect(&gateway).await;
    let (events_tx, _events_rx) = mpsc::channel(8);
    let _session = tokio::spawn(client.run(events_tx));

    peer.send(hello(45_000)).await.unwrap();
    assert_eq!(peer.next_frame().await.unwrap()["op"], 2);

    peer.send(hello(45_000)).await.unwrap();
    peer.send(hello(30_000)).await.unwrap();
    peer.send(heartbeat_request()).await.unwrap();

    // The next frame is the heartbeat reply, not a second Identify
    let frame = peer.next_frame().await.unwrap();
    assert_eq!(frame["op"], 1);
    assert!(frame["d"].is_null());
}

// ============================================================================
// Bridge Tests
// ============================================================================

struct Harness {
    api: MockApi,
    gateway: MockGateway,
    log: tempfile::NamedTempFile,
}

impl Harness {
    async fn start() -> Self {
        let api = MockApi::start().await.unwrap();
        let gateway = MockGateway::bind().await.unwrap();
        api.set_gateway_url(gateway.url());
        let log = tempfile::NamedTempFile::new().unwrap();
        Self { api, gateway, log }
    }

    fn spawn_bridge(
        &self,
        game_addr: SocketAddr,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<Result<(), AppError>> {
        let config = bridge_config(&self.api, 500, self.log.path(), game_addr).unwrap();
        tokio::spawn(discraft_bridge::run(config, shutdown))
    }

    /// Accept the bridge's session and complete the handshake
    async fn identified_peer(&self) -> GatewayPeer {
        let mut peer = self.gateway.accept().await.unwrap();
        peer.send(hello(45_000)).await.unwrap();
        let identify = peer.next_op(2).await.unwrap();
        assert_eq!(identify["d"]["token"], TEST_TOKEN);
        peer.send(ready(1)).await.unwrap();
        peer
    }
}

#[tokio::test]
async fn test_bridge_end_to_end() {
    let harness = Harness::start().await;
    let (game_addr, _game) = spawn_status_server(&["zed", "alex"]).await.unwrap();
    let bridge = harness.spawn_bridge(game_addr, CancellationToken::new());

    let mut peer = harness.identified_peer().await;
    peer.wait_for_presence("is 2 players").await.unwrap();

    peer.send(mention(2, 42, "<@!123> ping")).await.unwrap();
    let pong = harness.api.wait_for_post("pong").await.unwrap();
    assert_eq!(pong.channel_id, "42");
    assert_eq!(pong.authorization, Some(format!("Bot {TEST_TOKEN}")));

    peer.send(mention(3, 42, "<@123> list")).await.unwrap();
    harness.api.wait_for_post("Online players: alex, zed").await.unwrap();

    append(harness.log.path(), "[12:00:00] [Server thread/INFO]: steve joined the game");
    let joined = harness.api.wait_for_post("steve joined").await.unwrap();
    assert_eq!(joined.channel_id, "500");
    peer.wait_for_presence("is 3 players").await.unwrap();

    append(harness.log.path(), "[12:00:05] [Server thread/INFO]: <steve> hello everyone");
    harness.api.wait_for_post("steve: hello everyone").await.unwrap();

    peer.send(reconnect()).await.unwrap();
    let err = tokio::time::timeout(WAIT, bridge).await.unwrap().unwrap().unwrap_err();
    assert!(matches!(err, AppError::ReconnectRequested));
    assert_eq!(err.exit_code(), EXIT_OK);
}

#[tokio::test]
async fn test_unreachable_game_server_and_shutdown() {
    let harness = Harness::start().await;
    let port = closed_port().await.unwrap();
    let shutdown = CancellationToken::new();
    let bridge = harness.spawn_bridge(SocketAddr::from(([127, 0, 0, 1], port)), shutdown.clone());

    let mut peer = harness.identified_peer().await;
    peer.wait_for_presence(PING_FAILED_STATUS).await.unwrap();

    shutdown.cancel();
    tokio::time::timeout(WAIT, bridge).await.unwrap().unwrap().unwrap();
    assert!(harness.api.posts().is_empty());
}

#[tokio::test]
async fn test_missing_log_fails_after_connect() {
    let harness = Harness::start().await;
    let port = closed_port().await.unwrap();
    let missing = harness.log.path().with_extension("missing");
    let config = bridge_config(
        &harness.api,
        500,
        &missing,
        SocketAddr::from(([127, 0, 0, 1], port)),
    )
    .unwrap();

    let (result, _peer) = tokio::join!(
        discraft_bridge::run(config, CancellationToken::new()),
        harness.gateway.accept()
    );
    let err = result.unwrap_err();
    assert!(matches!(err, AppError::GameServer(_)));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(err.exit_code(), EXIT_FAILURE);
}
