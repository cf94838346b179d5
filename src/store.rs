//! Shared price book read and written by both protocol adapters.
//!
//! The HTTP bootstrap endpoint and the WebSocket broadcaster walk the same
//! prices, so the last historical point a client fetches lines up with the
//! first live point it streams.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Seed prices for the tracked assets.
pub const INITIAL_PRICES: [(&str, f64); 4] = [
    ("BTC", 60_000.00),
    ("ETH", 3_500.00),
    ("SOL", 150.00),
    ("DOGE", 0.15),
];

/// Current price per asset, shared across tasks.
#[derive(Debug, Clone)]
pub struct PriceBook {
    prices: Arc<RwLock<HashMap<String, f64>>>,
}

impl Default for PriceBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceBook {
    /// Create a book seeded with [`INITIAL_PRICES`].
    pub fn new() -> Self {
        let prices = INITIAL_PRICES
            .iter()
            .map(|(asset, price)| (asset.to_string(), *price))
            .collect();
        Self {
            prices: Arc::new(RwLock::new(prices)),
        }
    }

    pub fn get(&self, asset_id: &str) -> Option<f64> {
        self.prices
            .read()
            .expect("price book lock poisoned")
            .get(asset_id)
            .copied()
    }

    pub fn set(&self, asset_id: &str, price: f64) {
        self.prices
            .write()
            .expect("price book lock poisoned")
            .insert(asset_id.to_string(), price);
    }

    /// Asset ids tracked by the feed, in the seed order.
    pub fn tracked_assets(&self) -> Vec<String> {
        INITIAL_PRICES
            .iter()
            .map(|(asset, _)| asset.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_and_updates_prices() {
        let book = PriceBook::new();
        assert_eq!(book.get("BTC"), Some(60_000.0));
        assert_eq!(book.get("XRP"), None);

        book.set("BTC", 61_234.5);
        assert_eq!(book.get("BTC"), Some(61_234.5));
        assert_eq!(book.tracked_assets().len(), 4);
    }
}
