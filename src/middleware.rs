use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use crate::client_key::client_key;
use crate::state::AppState;

/// Runs the admission check before anything else sees the request.
///
/// The peer address comes from `ConnectInfo` when the server was started
/// with `into_make_service_with_connect_info`; without it only
/// `X-Forwarded-For` identifies the caller.
pub async fn admission_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    if state.admission.admit(&key).is_allowed() {
        return next.run(request).await;
    }

    too_many_requests()
}

pub fn too_many_requests() -> Response {
    let body = Json(json!({
        "error": {
            "code": "RATE_LIMIT_EXCEEDED",
            "message": "Too many requests",
        }
    }));

    (StatusCode::TOO_MANY_REQUESTS, body).into_response()
}
