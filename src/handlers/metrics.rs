use axum::{extract::State, http::StatusCode};
use prometheus::{Encoder, TextEncoder};
use tracing::warn;
use crate::metrics::TRACKED_CLIENTS;
use crate::state::AppState;

// Prometheus text exposition of the default registry
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    TRACKED_CLIENTS.set(state.admission.tracked_clients() as f64);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        warn!(error = %e, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
