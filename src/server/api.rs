//! HTTP bootstrap endpoint.

use super::AppState;
use crate::models::DataPoint;
use crate::simulator;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

/// `GET /api/initial_data` — backdated history for every tracked asset,
/// chronologically sorted. The walk ends are written back to the price book
/// so the stream continues from the last historical price.
pub async fn initial_data(State(state): State<AppState>) -> Json<Vec<DataPoint>> {
    let history = simulator::initial_history(&state.book, state.history_size);
    info!(points = history.len(), "[API] served initial data");
    Json(history)
}

/// Unknown paths answer a JSON 404, like the original adapter.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}
