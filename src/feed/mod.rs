//! Client-side price feed component.
//!
//! Responsibilities:
//! • Fetch the historical series once at activation (bootstrap).
//! • Keep exactly one streaming connection alive, validating every message.
//! • Maintain a bounded in-memory series for consumers.
//! • Recover from disconnects with bounded exponential backoff, bypassed by
//!   external recovery triggers.

pub mod bootstrap;
mod connector;
pub mod machine;
pub mod retry;
pub mod series;
pub mod validator;

use crate::errors::Result;
use crate::models::{DataPoint, FeedSnapshot};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Endpoints and limits for one feed instance.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Historical-data endpoint, e.g. `http://127.0.0.1:8000/api/initial_data`.
    pub api_url: String,
    /// Streaming endpoint, e.g. `ws://127.0.0.1:8000/ws`.
    pub ws_url: String,
    /// Series capacity.
    pub capacity: usize,
}

impl FeedConfig {
    pub fn new(api_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ws_url: ws_url.into(),
            capacity: series::SERIES_CAP,
        }
    }

    /// Endpoints from `FEED_API_URL` / `FEED_WS_URL`, defaulting to a local
    /// feed server.
    pub fn from_env() -> Self {
        let api_url = std::env::var("FEED_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api/initial_data".to_string());
        let ws_url =
            std::env::var("FEED_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:8000/ws".to_string());
        Self::new(api_url, ws_url)
    }
}

/// Inputs funneled into the driver task, serialized with connection events.
pub(crate) enum FeedEvent {
    /// The one-shot bootstrap fetch finished.
    Bootstrap(Result<Vec<DataPoint>>),
    /// Environment recovery signal (tab visible again / network online).
    Recover,
}

/// Handle to a running feed component.
///
/// Dropping the handle (or calling [`PriceFeed::shutdown`]) cancels the
/// teardown token first, which every pending wait in the driver checks before
/// touching state, then the pending retry timer and the connection go with
/// the driver task.
pub struct PriceFeed {
    snapshot_rx: watch::Receiver<FeedSnapshot>,
    events: mpsc::UnboundedSender<FeedEvent>,
    cancel: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl PriceFeed {
    /// Activate the component: start the bootstrap fetch and the first
    /// connection attempt concurrently.
    pub fn spawn(config: FeedConfig) -> Result<Self> {
        // Reject malformed endpoints before any task starts.
        Url::parse(&config.ws_url)?;
        Url::parse(&config.api_url)?;

        let machine = machine::FeedMachine::new(config.capacity);
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let bootstrap_tx = events_tx.clone();
        let api_url = config.api_url.clone();
        tokio::spawn(async move {
            let client = reqwest::Client::new();
            let result = bootstrap::fetch_initial(&client, &api_url).await;
            // The driver ignores this if it was already torn down.
            let _ = bootstrap_tx.send(FeedEvent::Bootstrap(result));
        });

        let driver = tokio::spawn(connector::run(
            config,
            machine,
            snapshot_tx,
            events_rx,
            cancel.clone(),
        ));

        Ok(Self {
            snapshot_rx,
            events: events_tx,
            cancel,
            driver: Some(driver),
        })
    }

    /// Current consumer-facing view.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch receiver for consumers that want change notifications.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Deliver an external recovery trigger.
    ///
    /// If the connection is not open this cancels any pending backoff timer,
    /// resets the attempt counter, and reconnects immediately — including out
    /// of the suspended state. While open it is a no-op.
    pub fn notify_recovery(&self) {
        let _ = self.events.send(FeedEvent::Recover);
    }

    /// Deactivate the component and wait for the driver to wind down.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
