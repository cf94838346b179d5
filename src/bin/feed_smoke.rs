//! Runs a live feed client against a running server for ~20 seconds and
//! prints what it observed. Endpoints come from `FEED_API_URL` / `FEED_WS_URL`.

use price_feed::feed::{FeedConfig, PriceFeed};
use std::time::{Duration, Instant};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    price_feed::utils::init_logging();

    let feed = PriceFeed::spawn(FeedConfig::from_env())?;
    let mut snapshots = feed.subscribe();

    let started = Instant::now();
    let mut updates = 0u64;
    while started.elapsed() < Duration::from_secs(20) {
        match tokio::time::timeout(Duration::from_secs(5), snapshots.changed()).await {
            Ok(Ok(())) => updates += 1,
            Ok(Err(_)) => break,
            Err(_) => {
                // No update within the timeout; keep waiting out the window.
            }
        }
    }

    let snap = feed.snapshot();
    println!(
        "ok updates={updates} series_len={} connected={} loading={} error={:?}",
        snap.series.len(),
        snap.is_connected,
        snap.is_loading,
        snap.error
    );
    feed.shutdown().await;
    Ok(())
}
