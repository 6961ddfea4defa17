//! Streak entry point
//!
//! Run with:
//! ```bash
//! cargo run -p streak-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use streak_common::{try_init_tracing, AppConfig, AppResult};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "Streak failed");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> AppResult<()> {
    info!("Starting Streak...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        status = %config.discord.status,
        servers = config.discord.servers.len(),
        health_port = config.health.port,
        "Configuration loaded"
    );

    streak_gateway::run(config).await
}
