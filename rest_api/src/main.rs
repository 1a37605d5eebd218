// rest_api/src/main.rs

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rest_api::config::load_rest_api_config;
use rest_api::start_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_rest_api_config().context("Failed to load REST API configuration")?;
    info!("Safe Trail API starting on http://{}:{}", config.host, config.port);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    start_server(&config, shutdown_rx).await
}
