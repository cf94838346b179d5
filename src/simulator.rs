//! Random-walk price generator.
//!
//! Every point nudges the current book price by a uniform factor in
//! [0.995, 1.005] and writes the result back, so consecutive batches form a
//! continuous walk shared by both protocol adapters.

use crate::models::{DataPoint, PointId};
use crate::store::PriceBook;
use chrono::{Duration, SecondsFormat, Utc};
use rand::Rng;

const WALK_FACTOR_MIN: f64 = 0.995;
const WALK_FACTOR_MAX: f64 = 1.005;
const VOLUME_MIN: u64 = 1_000_000;
const VOLUME_MAX: u64 = 10_000_000;

fn round_price(price: f64) -> f64 {
    (price * 10_000.0).round() / 10_000.0
}

fn walk(rng: &mut impl Rng, price: f64) -> f64 {
    round_price(price * rng.gen_range(WALK_FACTOR_MIN..=WALK_FACTOR_MAX))
}

fn point(asset_id: &str, timestamp: String, price_usd: f64, volume_24h: f64) -> DataPoint {
    DataPoint {
        id: PointId::Text(uuid::Uuid::new_v4().to_string()),
        asset_id: asset_id.to_string(),
        timestamp,
        price_usd,
        volume_24h,
    }
}

/// Generate one new data point for `asset_id`, advancing the book price.
pub fn next_point(book: &PriceBook, asset_id: &str) -> Option<DataPoint> {
    let mut rng = rand::thread_rng();
    let current = book.get(asset_id)?;
    let price = walk(&mut rng, current);
    book.set(asset_id, price);
    Some(point(
        asset_id,
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        price,
        rng.gen_range(VOLUME_MIN..=VOLUME_MAX) as f64,
    ))
}

/// Generate one batch with a fresh point for every tracked asset.
pub fn next_batch(book: &PriceBook) -> Vec<DataPoint> {
    book.tracked_assets()
        .iter()
        .filter_map(|asset| next_point(book, asset))
        .collect()
}

/// Generate `history_size` backdated points per tracked asset, sorted
/// chronologically.
///
/// The walk ends are written back to the book so the last historical price of
/// each asset is also the first live price the stream will move from.
pub fn initial_history(book: &PriceBook, history_size: usize) -> Vec<DataPoint> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut history = Vec::with_capacity(history_size * book.tracked_assets().len());

    for asset in book.tracked_assets() {
        let Some(mut price) = book.get(&asset) else {
            continue;
        };
        // Walk from the oldest point towards now so the newest historical
        // price is the one the live stream continues from.
        for step in (0..history_size).rev() {
            let backdate_ms = (step as f64 * rng.gen_range(5.0..15.0) * 1_000.0) as i64;
            let past = now - Duration::milliseconds(backdate_ms);
            price = walk(&mut rng, price);
            history.push(point(
                &asset,
                past.to_rfc3339_opts(SecondsFormat::Micros, true),
                price,
                rng.gen_range(VOLUME_MIN..=VOLUME_MAX) as f64,
            ));
        }
        book.set(&asset, price);
    }

    // RFC 3339 with fixed precision sorts lexicographically by time.
    history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    history
}
