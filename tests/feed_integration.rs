//! End-to-end tests: a real server on an ephemeral port against a real feed
//! client.

use price_feed::config::AppConfig;
use price_feed::feed::{FeedConfig, PriceFeed};
use price_feed::models::FeedSnapshot;
use price_feed::server;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn test_server_config(port: u16) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port,
        feed_interval_ms: 50,
        history_size: 5,
    }
}

fn feed_config(addr: SocketAddr) -> FeedConfig {
    FeedConfig::new(
        format!("http://{addr}/api/initial_data"),
        format!("ws://{addr}/ws"),
    )
}

/// Wait until the published snapshot satisfies `pred`, or fail the test.
async fn wait_for(
    feed: &PriceFeed,
    deadline: Duration,
    pred: impl Fn(&FeedSnapshot) -> bool,
) -> FeedSnapshot {
    let mut rx = feed.subscribe();
    tokio::time::timeout(deadline, async {
        loop {
            {
                let snap = rx.borrow();
                if pred(&snap) {
                    return snap.clone();
                }
            }
            rx.changed().await.expect("feed driver ended unexpectedly");
        }
    })
    .await
    .expect("snapshot condition not reached in time")
}

#[tokio::test]
async fn bootstrap_then_stream_end_to_end() {
    let cancel = CancellationToken::new();
    let addr = server::start(test_server_config(0), cancel.clone())
        .await
        .expect("server should bind");

    let feed = PriceFeed::spawn(feed_config(addr)).expect("feed should spawn");

    // Bootstrap: 5 historical points for each of the 4 tracked assets.
    let bootstrap_len = 5 * 4;
    let snap = wait_for(&feed, Duration::from_secs(10), |s| {
        !s.is_loading && s.is_connected && s.series.len() > bootstrap_len
    })
    .await;

    assert!(snap.error.is_none(), "no error expected: {:?}", snap.error);
    for point in &snap.series {
        assert!(!point.asset_id.is_empty());
        assert!(point.price_usd.is_finite());
        assert!(point.volume_24h.is_finite());
    }
    // Bootstrap history is chronologically sorted.
    for window in snap.series[..bootstrap_len].windows(2) {
        assert!(window[0].timestamp <= window[1].timestamp);
    }

    feed.shutdown().await;
    cancel.cancel();
}

#[tokio::test]
async fn bootstrap_failure_does_not_block_the_stream() {
    let cancel = CancellationToken::new();
    let addr = server::start(test_server_config(0), cancel.clone())
        .await
        .expect("server should bind");

    // Wrong bootstrap path (404), correct stream endpoint.
    let config = FeedConfig::new(
        format!("http://{addr}/api/wrong_path"),
        format!("ws://{addr}/ws"),
    );
    let feed = PriceFeed::spawn(config).expect("feed should spawn");

    let snap = wait_for(&feed, Duration::from_secs(10), |s| {
        !s.is_loading && s.error.is_some() && s.is_connected && !s.series.is_empty()
    })
    .await;

    // The error is persistent but the stream still fills the series.
    assert!(snap.error.as_deref().unwrap().contains("historical data"));

    feed.shutdown().await;
    cancel.cancel();
}

#[tokio::test]
async fn shutdown_cancels_a_pending_retry_timer() {
    // Grab an ephemeral port and close it again so connects are refused fast.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let feed = PriceFeed::spawn(feed_config(addr)).expect("feed should spawn");

    // Let the first attempt fail and the 1s backoff timer get scheduled.
    let snap = wait_for(&feed, Duration::from_secs(5), |s| {
        !s.is_connected && !s.is_loading
    })
    .await;
    assert!(snap.series.is_empty());

    // Deactivation must not wait out the timer.
    tokio::time::timeout(Duration::from_millis(500), feed.shutdown())
        .await
        .expect("shutdown should cancel the pending retry timer");
}

#[tokio::test]
async fn recovery_trigger_reconnects_after_a_server_restart() {
    let cancel = CancellationToken::new();
    let addr = server::start(test_server_config(0), cancel.clone())
        .await
        .expect("server should bind");

    let feed = PriceFeed::spawn(feed_config(addr)).expect("feed should spawn");
    wait_for(&feed, Duration::from_secs(10), |s| {
        s.is_connected && !s.series.is_empty()
    })
    .await;

    // Take the server down; the client observes the close.
    cancel.cancel();
    wait_for(&feed, Duration::from_secs(10), |s| !s.is_connected).await;

    // Bring a new server up on the same port and fire the trigger. The old
    // listener needs a moment to wind down before the port can be rebound.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let cancel2 = CancellationToken::new();
    server::start(test_server_config(addr.port()), cancel2.clone())
        .await
        .expect("server should rebind the port");
    feed.notify_recovery();

    let snap = wait_for(&feed, Duration::from_secs(10), |s| s.is_connected).await;
    assert!(snap.error.is_none());

    feed.shutdown().await;
    cancel2.cancel();
}
