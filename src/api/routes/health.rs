//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (upstream reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 only if the nutrition data API answers its health check.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_upstream_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upstream_ok = check_upstream_health(&state).await;

    let (status, upstream) = if upstream_ok {
        ("healthy", "ok")
    } else {
        ("degraded", "error")
    };

    Json(HealthResponse {
        status: status.to_string(),
        upstream: upstream.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_upstream_health(state: &AppState) -> bool {
    match state.service.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Upstream health check failed");
            false
        }
    }
}
