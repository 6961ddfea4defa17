//! Process wiring
//!
//! Validates the token, then runs one supervisor per peer plus the health server
//! until Ctrl-C.

use crate::connection::ConnectionContext;
use crate::identity::fetch_identity;
use crate::reconnect::Supervisor;
use crate::server;
use std::sync::Arc;
use streak_common::{AppConfig, AppError, AppResult};
use tokio::task::JoinSet;

/// Run the presence client with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let AppConfig {
        discord,
        gateway,
        health,
    } = config;

    let client = reqwest::Client::builder()
        .timeout(gateway.connect_timeout)
        .build()
        .map_err(AppError::internal)?;

    let user = fetch_identity(&client, &gateway.api_url, &discord.token).await?;
    tracing::info!("Logged in as {}", user);
    tracing::info!(
        status = %discord.status,
        servers = discord.servers.len(),
        "Starting gateway sessions"
    );

    let gateway = Arc::new(gateway);
    let mut tasks = JoinSet::new();

    for (index, peer) in discord.servers.iter().enumerate() {
        let ctx = ConnectionContext::new(index, &discord, peer.clone(), Arc::clone(&gateway));
        tracing::debug!(peer = ctx.label(), target = %peer, "Spawning supervisor");
        tasks.spawn(Supervisor::new(Arc::new(ctx)).run());
    }

    tasks.spawn(async move {
        if let Err(e) = server::run_server(&health).await {
            tracing::error!(error = %e, "Health server stopped");
        }
    });

    tokio::select! {
        () = shutdown_signal() => {
            tracing::info!("Shutting down...");
        }
        () = drain(&mut tasks) => {
            tracing::warn!("All tasks exited");
        }
    }

    tasks.shutdown().await;
    Ok(())
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Task failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
