//! Async driver that owns the single WebSocket connection.
//!
//! One task runs the whole lifecycle: connect, read, back off, reconnect.
//! Every mutation of the machine happens here, serialized by the event loop,
//! and every wait point also listens for cancellation and external events.

use crate::feed::machine::{FeedMachine, RecoveryAction};
use crate::feed::{FeedConfig, FeedEvent};
use crate::models::FeedSnapshot;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) async fn run(
    config: FeedConfig,
    mut machine: FeedMachine,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    mut events: mpsc::UnboundedReceiver<FeedEvent>,
    cancel: CancellationToken,
) {
    let publish = |machine: &FeedMachine| {
        let _ = snapshot_tx.send(machine.snapshot());
    };

    'lifecycle: loop {
        if cancel.is_cancelled() {
            break;
        }

        // ---- connecting ------------------------------------------------
        let connect = connect_async(config.ws_url.as_str());
        tokio::pin!(connect);
        let attempt = loop {
            tokio::select! {
                _ = cancel.cancelled() => break 'lifecycle,
                res = &mut connect => break res,
                ev = events.recv() => match ev {
                    Some(FeedEvent::Bootstrap(result)) => {
                        machine.on_bootstrap(result);
                        publish(&machine);
                    }
                    // Already connecting: reset the counter and let the
                    // in-flight attempt stand in for the immediate open.
                    Some(FeedEvent::Recover) => {
                        machine.on_trigger();
                    }
                    None => break 'lifecycle,
                },
            }
        };

        match attempt {
            Ok((mut stream, _resp)) => {
                machine.on_open();
                publish(&machine);
                info!("[FEED] stream connected");

                // ---- open --------------------------------------------
                let mut teardown = false;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            teardown = true;
                            break;
                        }
                        ev = events.recv() => match ev {
                            Some(FeedEvent::Bootstrap(result)) => {
                                machine.on_bootstrap(result);
                                publish(&machine);
                            }
                            Some(FeedEvent::Recover) => {
                                // No-op while open.
                                machine.on_trigger();
                            }
                            None => {
                                teardown = true;
                                break;
                            }
                        },
                        msg = stream.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                if machine.on_frame(&text) > 0 {
                                    publish(&machine);
                                }
                            }
                            Some(Ok(Message::Close(frame))) => {
                                debug!(?frame, "[FEED] close frame received");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                // Errors precede closes; the close handling
                                // below is the authoritative transition.
                                warn!(error = %e, "[FEED] stream transport error");
                                break;
                            }
                            None => break,
                        },
                    }
                }
                if teardown {
                    let _ = stream.close(None).await;
                    break 'lifecycle;
                }
            }
            Err(e) => {
                warn!(error = %e, "[FEED] connect attempt failed");
            }
        }

        // ---- closed: hand off to the recovery scheduler ----------------
        let Some(action) = machine.on_closed() else {
            continue;
        };
        publish(&machine);

        match action {
            RecoveryAction::Schedule(delay) => {
                info!(
                    attempts = machine.attempts(),
                    delay_s = delay.as_secs(),
                    "[FEED] reconnect scheduled"
                );
                let timer = tokio::time::sleep(delay);
                tokio::pin!(timer);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break 'lifecycle,
                        _ = &mut timer => {
                            machine.on_retry_fire();
                            break;
                        }
                        ev = events.recv() => match ev {
                            Some(FeedEvent::Bootstrap(result)) => {
                                machine.on_bootstrap(result);
                                publish(&machine);
                            }
                            Some(FeedEvent::Recover) => {
                                info!("[FEED] recovery trigger, reconnecting immediately");
                                machine.on_trigger();
                                break;
                            }
                            None => break 'lifecycle,
                        },
                    }
                }
            }
            RecoveryAction::Suspend => loop {
                tokio::select! {
                    _ = cancel.cancelled() => break 'lifecycle,
                    ev = events.recv() => match ev {
                        Some(FeedEvent::Bootstrap(result)) => {
                            machine.on_bootstrap(result);
                            publish(&machine);
                        }
                        Some(FeedEvent::Recover) => {
                            info!("[FEED] recovery trigger, leaving suspension");
                            machine.on_trigger();
                            break;
                        }
                        None => break 'lifecycle,
                    },
                }
            },
        }
    }

    debug!("[FEED] driver stopped");
}
