use anyhow::Result;
use price_feed::{config::AppConfig, server, utils};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        feed_interval_ms = config.feed_interval_ms,
        history_size = config.history_size,
        "[INIT] price feed server starting"
    );

    let cancel = CancellationToken::new();
    let addr = server::start(config, cancel.clone()).await?;
    tracing::info!(%addr, "[INIT] bootstrap endpoint at /api/initial_data, stream at /ws");

    tokio::signal::ctrl_c().await?;
    tracing::info!("[SHUTDOWN] ctrl-c received, stopping");
    cancel.cancel();
    Ok(())
}
