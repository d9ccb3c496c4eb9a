//! card2card API Binary
//!
//! Serves the transfer endpoints over HTTP in front of the in-memory
//! two-phase transfer ledger.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card2card_api::{router, ApiConfig};
use card2card_engine::TransferEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting card2card transfer service");

    if let Err(message) = config.validate() {
        return Err(anyhow::anyhow!("Configuration error: {message}"));
    }

    let engine_config = config.engine_config()?;
    let engine = Arc::new(TransferEngine::from_config(&engine_config));
    info!(
        accounts = engine_config.seed_accounts.len(),
        commission_account = %engine_config.commission_account,
        "Ledger seeded"
    );

    let app = router(engine);

    let addr = format!("{}:{}", config.listen_addr, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
