//! Process wiring
//!
//! Discovers the gateway, connects it, starts both game server adapters and
//! the coordinator, then waits for the gateway session to end.

use crate::coordinator::Coordinator;
use discraft_common::{AppConfig, AppError, AppResult};
use discraft_gateway::{gateway_url, GatewayClient, GatewayConfig, GatewayError};
use discraft_minecraft::{LogFollower, ServerListPing, StatusPoller};
use discraft_rest::RestClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the gateway and game server event channels
pub const EVENT_BUFFER_SIZE: usize = 256;

fn gateway_error(err: GatewayError) -> AppError {
    if err.is_reconnect_request() {
        tracing::info!(reason = %err, "Gateway asked for a new session");
        AppError::ReconnectRequested
    } else {
        AppError::gateway(err)
    }
}

/// Run the bridge until the gateway session ends or `shutdown` is cancelled
pub async fn run(config: AppConfig, shutdown: CancellationToken) -> AppResult<()> {
    let rest = RestClient::new(&config.discord.api_base, config.discord.token.clone())
        .map_err(AppError::rest)?;
    let discovered = rest
        .get_gateway_bot()
        .await
        .map_err(AppError::rest)?;

    let url = gateway_url(&discovered.url).map_err(gateway_error)?;
    let gateway = GatewayClient::connect(
        &url,
        GatewayConfig::new(config.discord.token.clone(), config.discord.intents),
    )
    .await
    .map_err(gateway_error)?;

    let follower = LogFollower::open(&config.minecraft.log_path)
        .await
        .map_err(AppError::game_server)?;

    let (gateway_tx, gateway_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let (server_tx, server_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let adapters = shutdown.child_token();

    let mut log_task = tokio::spawn(follower.run(server_tx.clone(), adapters.clone()));

    let ping = ServerListPing::new(
        config.minecraft.host.clone(),
        config.minecraft.port,
        config.minecraft.ping_timeout,
    );
    let poll_task = tokio::spawn(
        StatusPoller::new(ping, config.minecraft.poll_interval).run(server_tx, adapters.clone()),
    );

    let coordinator = Arc::new(Coordinator::new(
        config.discord.channel_id,
        rest.clone(),
        gateway.connection(),
    ));
    let coordinator_task = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.run(gateway_rx, server_rx).await })
    };

    tracing::info!(
        channel_id = %config.discord.channel_id,
        log_path = %config.minecraft.log_path.display(),
        server = %config.minecraft.address(),
        "Bridge running"
    );

    let session = gateway.run(gateway_tx);
    tokio::pin!(session);
    let mut log_running = true;

    let result = loop {
        tokio::select! {
            result = &mut session => break result.map_err(gateway_error),
            joined = &mut log_task, if log_running => {
                log_running = false;
                match joined {
                    Ok(Ok(())) => tracing::info!("Log follower finished"),
                    Ok(Err(e)) => break Err(AppError::game_server(e)),
                    Err(e) => break Err(AppError::Internal(anyhow::Error::new(e))),
                }
            }
            () = shutdown.cancelled() => {
                tracing::info!("Shutdown requested");
                break Ok(());
            }
        }
    };

    coordinator_task.abort();
    adapters.cancel();
    if log_running {
        log_task.abort();
    }
    if let Err(e) = poll_task.await {
        tracing::warn!(error = %e, "Status poller task failed");
    }

    result
}
