//! Admission-controlled HTTP gateway.
//!
//! [`rate_limit::AdmissionController`] decides per client whether a request
//! may pass; [`build_router`] puts it in front of every route.

pub mod client_key;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod rate_limit;
pub mod state;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use handlers::{health_handler, metrics_handler};
use state::AppState;

pub use config::AdmissionConfig;
pub use error::ConfigError;
pub use rate_limit::{AdmissionController, Decision};

/// Builds the gateway's HTTP router.
///
/// Every route, health and metrics included, goes through
/// [`middleware::admission_layer`] first.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(from_fn_with_state(state.clone(), middleware::admission_layer))
        .with_state(state)
}
