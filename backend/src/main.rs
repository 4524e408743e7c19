use std::sync::Arc;

use anyhow::Context;
use backend::{api, config::ServerArgs};
use chess_agent::{ChessAgent, FileSnapshot};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    let sink = FileSnapshot::new(&args.model);
    let table = sink.load_or_empty();
    let agent = Arc::new(
        ChessAgent::new(args.agent_config(), table, Arc::new(sink))
            .context("Invalid agent configuration")?,
    );

    let app = api::router(agent.clone());
    let listener = TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;
    info!("[API] Listening on {}", args.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("[API] Shutting down, saving model to {}", args.model.display());
    if let Err(e) = agent.save() {
        error!("[API] Failed to save model: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("[API] Failed to listen for shutdown signal: {}", e);
    }
}
