//! WebSocket push endpoint.

use super::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// `GET /ws` — upgrade and attach the client to the broadcast feed.
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Forward every broadcast batch to one client.
///
/// Fail-fast cleanup: a failed send means the connection is dead and the task
/// ends immediately, so dead sockets never accumulate. The feed is
/// server-push only; inbound frames are drained just to notice the close.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = uuid::Uuid::new_v4();
    info!(%client_id, "[WS] client connected");
    let mut feed_rx = state.feed_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sender.send(Message::Close(None)).await;
                info!(%client_id, "[WS] closing client for shutdown");
                break;
            }
            batch = feed_rx.recv() => match batch {
                Ok(payload) => {
                    if sender.send(Message::Text(payload)).await.is_err() {
                        info!(%client_id, "[WS] client removed (send failed)");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%client_id, skipped, "[WS] slow client lagged behind the feed");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => {
                    info!(%client_id, "[WS] client disconnected");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    info!(%client_id, error = %e, "[WS] client read error");
                    break;
                }
            },
        }
    }
}
