use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    upstream: String,
}

/// Health check endpoint
///
/// The service holds no state and talks to exactly one dependency, so the
/// only thing worth reporting besides liveness is whether the upstream
/// credential is configured. Always 200 - a missing credential degrades
/// searches but the process is healthy.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let upstream = if state.client.is_some() {
        "configured"
    } else {
        "missing_credential"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            upstream: upstream.to_string(),
        }),
    )
}
