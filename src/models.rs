//! Shared data structures used throughout the application.

use serde::{Deserialize, Serialize};

/// Identifier of a data point as it appears on the wire.
///
/// The feed emits UUID strings, but integer ids are accepted as well so that
/// replayed or hand-crafted payloads pass validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Int(u64),
    Text(String),
}

/// One priced observation of an asset, both the wire format and the in-memory
/// unit of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: PointId,
    pub asset_id: String,
    /// ISO-8601 / RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub price_usd: f64,
    pub volume_24h: f64,
}

/// Consumer-facing view of the feed component.
///
/// `error` carries only the bootstrap failure; connection trouble is reported
/// through `is_connected` alone so ordinary reconnects do not flicker an error
/// at the user.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub series: Vec<DataPoint>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_connected: bool,
}
