//! Connection and recovery state machine for the price feed.
//!
//! The machine is pure: transitions are plain method calls and IO lives in
//! the connector. Illegal transitions (a frame while closed, a second close)
//! are explicit no-ops instead of scattered callback mutation.

use crate::errors::AppError;
use crate::feed::retry::RetryPolicy;
use crate::feed::series::Series;
use crate::feed::validator;
use crate::models::{DataPoint, FeedSnapshot};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of the single peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Where the recovery scheduler currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Idle,
    Scheduled,
    Attempting,
    Suspended,
}

/// What the connector should do after a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Schedule a reconnect timer for the given delay.
    Schedule(Duration),
    /// Retry budget exhausted: wait passively for an external trigger.
    Suspend,
}

pub struct FeedMachine {
    series: Series,
    conn: ConnectionState,
    recovery: RecoveryState,
    attempts: u32,
    policy: RetryPolicy,
    is_loading: bool,
    error: Option<String>,
}

impl FeedMachine {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: Series::new(capacity),
            conn: ConnectionState::Connecting,
            recovery: RecoveryState::Idle,
            attempts: 0,
            policy: RetryPolicy::default(),
            is_loading: true,
            error: None,
        }
    }

    /// Outcome of the one-shot historical fetch.
    ///
    /// A failure is surfaced but never retried; the stream can still deliver
    /// data with no bootstrap. A success replaces the whole series, even if
    /// stream batches already landed — the response raced the stream and the
    /// full overwrite keeps the result well-defined.
    pub fn on_bootstrap(&mut self, result: Result<Vec<DataPoint>, AppError>) {
        self.is_loading = false;
        match result {
            Ok(points) => {
                info!(count = points.len(), "[FEED] bootstrap history loaded");
                self.series.replace(points);
            }
            Err(e) => {
                warn!(error = %e, "[FEED] bootstrap failed, continuing with stream only");
                self.error = Some(format!("failed to load historical data: {e}"));
            }
        }
    }

    /// The peer connection was established.
    pub fn on_open(&mut self) {
        self.conn = ConnectionState::Open;
        self.recovery = RecoveryState::Idle;
        self.attempts = 0;
    }

    /// Apply one raw stream payload. Returns the number of accepted points.
    pub fn on_frame(&mut self, raw: &str) -> usize {
        if self.conn != ConnectionState::Open {
            debug!("[FEED] ignoring frame received outside the open state");
            return 0;
        }
        match validator::parse_batch(raw) {
            Some(batch) => {
                let accepted = batch.len();
                self.series.extend(batch);
                accepted
            }
            None => 0,
        }
    }

    /// The connection closed, whatever the cause.
    ///
    /// Idempotent: a close while already closed returns `None` and changes
    /// nothing.
    pub fn on_closed(&mut self) -> Option<RecoveryAction> {
        if self.conn == ConnectionState::Closed {
            return None;
        }
        self.conn = ConnectionState::Closed;
        match self.policy.delay_for(self.attempts) {
            Some(delay) => {
                self.recovery = RecoveryState::Scheduled;
                Some(RecoveryAction::Schedule(delay))
            }
            None => {
                self.recovery = RecoveryState::Suspended;
                warn!("[FEED] retry budget exhausted, waiting for a recovery trigger");
                Some(RecoveryAction::Suspend)
            }
        }
    }

    /// The scheduled reconnect timer fired.
    ///
    /// The counter tracks progress through the backoff table on its own; a
    /// failed attempt re-enters the scheduler through [`Self::on_closed`].
    pub fn on_retry_fire(&mut self) {
        self.attempts += 1;
        self.recovery = RecoveryState::Attempting;
        self.conn = ConnectionState::Connecting;
    }

    /// External recovery trigger (tab became visible / network came back).
    ///
    /// Bypasses backoff entirely: resets the counter and requests an
    /// immediate open, including out of the suspended state. Returns `false`
    /// when the connection is already open and nothing should happen.
    pub fn on_trigger(&mut self) -> bool {
        if self.conn == ConnectionState::Open {
            return false;
        }
        self.attempts = 0;
        self.recovery = RecoveryState::Attempting;
        self.conn = ConnectionState::Connecting;
        true
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            series: self.series.to_vec(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            is_connected: self.conn == ConnectionState::Open,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.conn
    }

    pub fn recovery(&self) -> RecoveryState {
        self.recovery
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
