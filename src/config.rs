//! Configuration loader and application settings.

/// Consolidated server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host address the server binds to.
    pub host: String,
    /// Port the server binds to (0 picks an ephemeral port).
    pub port: u16,
    /// Milliseconds between broadcast batches.
    pub feed_interval_ms: u64,
    /// Historical points per asset served by the bootstrap endpoint.
    pub history_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            feed_interval_ms: 500,
            history_size: 50,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("HOST").unwrap_or(defaults.host);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let feed_interval_ms = std::env::var("FEED_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.feed_interval_ms);
        let history_size = std::env::var("HISTORY_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.history_size);
        Self {
            host,
            port,
            feed_interval_ms,
            history_size,
        }
    }
}
