//! Discraft bridge entry point
//!
//! Run with:
//! ```bash
//! cargo run -p discraft-bridge
//! ```
//!
//! Configuration is loaded from environment variables. Exit codes: 0 on
//! shutdown or when the gateway asks for a new session, 78 on bad
//! configuration, 1 on any other failure.

use discraft_common::{try_init_tracing_with_config, AppConfig, AppError, TracingConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    let tracing_config = match &config {
        Ok(config) => TracingConfig::for_environment(config.app.env),
        Err(_) => TracingConfig::development(),
    };
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            let err = AppError::from(e);
            error!(error = %err, "Failed to load configuration");
            std::process::exit(err.exit_code());
        }
    };

    info!(
        env = ?config.app.env,
        name = %config.app.name,
        channel_id = %config.discord.channel_id,
        "Configuration loaded"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    match discraft_bridge::run(config, shutdown).await {
        Ok(()) => info!("Bridge stopped"),
        Err(e) => {
            let code = e.exit_code();
            if code == discraft_common::EXIT_OK {
                info!(reason = %e, "Exiting for restart");
            } else {
                error!(error = %e, "Bridge failed");
            }
            std::process::exit(code);
        }
    }
}
