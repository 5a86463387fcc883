use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// "connected" or "disconnected"; the service keeps working either way.
    pub cache: &'static str,
}

/// Health check endpoint
///
/// Returns 200 OK whenever the service is running. Cache state is reported
/// for observability but never fails the probe: the service degrades to
/// uncached operation when the backend is down.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = if state.weather.cache().is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "OK",
        cache,
    })
}
