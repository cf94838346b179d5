//! Per-message schema gate between the stream and the series.

use crate::models::{DataPoint, PointId};
use serde_json::Value;
use tracing::warn;

const REQUIRED_FIELDS: [&str; 5] = ["id", "asset_id", "timestamp", "price_usd", "volume_24h"];

/// Validate one raw stream payload.
///
/// Returns the valid subset of the batch in wire order, or `None` when the
/// payload is undecodable, not an array, or yields no valid records — the
/// series must only ever be touched with fully-valid data.
pub fn parse_batch(raw: &str) -> Option<Vec<DataPoint>> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "[FEED] discarding undecodable stream payload");
            return None;
        }
    };

    let Value::Array(items) = value else {
        warn!("[FEED] discarding non-array stream payload");
        return None;
    };

    let total = items.len();
    let mut accepted = Vec::with_capacity(total);
    for item in items {
        match validate_point(&item) {
            Ok(point) => accepted.push(point),
            Err(fields) => {
                warn!(invalid_fields = ?fields, "[FEED] dropping malformed data point");
            }
        }
    }

    if accepted.is_empty() {
        warn!(total, "[FEED] stream batch contained no valid data points");
        return None;
    }
    Some(accepted)
}

/// Check a single candidate record, naming every missing or invalid field.
fn validate_point(value: &Value) -> std::result::Result<DataPoint, Vec<&'static str>> {
    let Some(obj) = value.as_object() else {
        return Err(REQUIRED_FIELDS.to_vec());
    };

    let mut invalid = Vec::new();

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(PointId::Text(s.clone())),
        Some(Value::Number(n)) if n.as_u64().is_some() => {
            n.as_u64().map(PointId::Int)
        }
        _ => None,
    };
    if id.is_none() {
        invalid.push("id");
    }

    let asset_id = obj
        .get("asset_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    if asset_id.is_none() {
        invalid.push("asset_id");
    }

    let timestamp = obj.get("timestamp").and_then(Value::as_str);
    if timestamp.is_none() {
        invalid.push("timestamp");
    }

    let price_usd = obj
        .get("price_usd")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite());
    if price_usd.is_none() {
        invalid.push("price_usd");
    }

    let volume_24h = obj
        .get("volume_24h")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite());
    if volume_24h.is_none() {
        invalid.push("volume_24h");
    }

    match (id, asset_id, timestamp, price_usd, volume_24h) {
        (Some(id), Some(asset_id), Some(timestamp), Some(price_usd), Some(volume_24h)) => {
            Ok(DataPoint {
                id,
                asset_id: asset_id.to_string(),
                timestamp: timestamp.to_string(),
                price_usd,
                volume_24h,
            })
        }
        _ => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undecodable_payload() {
        assert!(parse_batch("not json").is_none());
    }

    #[test]
    fn rejects_non_array_envelope() {
        assert!(parse_batch(r#"{"id":1}"#).is_none());
        assert!(parse_batch("null").is_none());
        assert!(parse_batch("42").is_none());
    }

    #[test]
    fn filters_invalid_elements_and_preserves_order() {
        let raw = r#"[
            {"id":"a","asset_id":"BTC","timestamp":"2024-01-01T00:00:00Z","price_usd":60000.0,"volume_24h":100},
            {"bad":"data"},
            null,
            {"id":2,"asset_id":"ETH","timestamp":"2024-01-01T00:00:01Z","price_usd":3500.0,"volume_24h":200}
        ]"#;
        let batch = parse_batch(raw).expect("two valid points");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].asset_id, "BTC");
        assert_eq!(batch[1].id, PointId::Int(2));
    }

    #[test]
    fn rejects_non_finite_and_mistyped_numbers() {
        let raw = r#"[
            {"id":1,"asset_id":"BTC","timestamp":"t","price_usd":"60000","volume_24h":100},
            {"id":2,"asset_id":"BTC","timestamp":"t","price_usd":60000.0,"volume_24h":null}
        ]"#;
        assert!(parse_batch(raw).is_none());
    }

    #[test]
    fn accepts_unknown_symbols_but_not_empty_ones() {
        let raw = r#"[
            {"id":1,"asset_id":"SHIB","timestamp":"t","price_usd":0.00001,"volume_24h":1},
            {"id":2,"asset_id":"","timestamp":"t","price_usd":1.0,"volume_24h":1}
        ]"#;
        let batch = parse_batch(raw).expect("unknown symbol is fine");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].asset_id, "SHIB");
    }

    #[test]
    fn empty_array_is_a_no_op() {
        assert!(parse_batch("[]").is_none());
    }
}
