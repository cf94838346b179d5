//! Thin protocol adapters over the shared price book.
//!
//! One process serves both halves of the dual-protocol channel: the HTTP
//! bootstrap endpoint and the WebSocket push stream, so both walk the same
//! prices.

pub mod api;
pub mod ws;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::simulator;
use crate::store::PriceBook;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub book: PriceBook,
    /// Fan-out channel carrying serialized batches to connected clients.
    pub feed_tx: broadcast::Sender<String>,
    pub history_size: usize,
    /// Server shutdown signal; WebSocket handlers close their clients on it.
    pub shutdown: CancellationToken,
}

/// Assemble the router with permissive CORS, matching the original adapters.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/api/initial_data", get(api::initial_data))
        .route("/ws", get(ws::upgrade))
        .fallback(api::not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind, spawn the broadcaster and the server, and return the bound address.
///
/// Port 0 picks an ephemeral port, which is how the integration tests run a
/// real server per test.
pub async fn start(config: AppConfig, cancel: CancellationToken) -> Result<SocketAddr> {
    let book = PriceBook::new();
    let (feed_tx, _) = broadcast::channel(32);
    let state = AppState {
        book: book.clone(),
        feed_tx: feed_tx.clone(),
        history_size: config.history_size,
        shutdown: cancel.clone(),
    };

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    let interval = Duration::from_millis(config.feed_interval_ms.max(1));
    let broadcaster_cancel = cancel.clone();
    tokio::spawn(async move {
        broadcast_loop(book, feed_tx, interval, broadcaster_cancel).await;
    });

    let app = router(state);
    tokio::spawn(async move {
        let shutdown = cancel.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
        if let Err(e) = result {
            error!(error = %e, "[SERVER] serve failed");
        }
    });

    Ok(addr)
}

/// Continuously generate batches and fan them out to every connected client.
async fn broadcast_loop(
    book: PriceBook,
    feed_tx: broadcast::Sender<String>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let batch = simulator::next_batch(&book);
                match serde_json::to_string(&batch) {
                    // A send error only means no clients are connected.
                    Ok(payload) => {
                        let _ = feed_tx.send(payload);
                    }
                    Err(e) => warn!(error = %e, "[SERVER] batch serialization failed"),
                }
            }
        }
    }
}
