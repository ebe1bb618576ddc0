//! Nourish REST API
//!
//! HTTP API layer for Nourish, built with Axum.
//!
//! # Endpoints
//!
//! ## Nutrition dashboard (authenticated, rate limited)
//! - `GET /api/v1/nutrition-dashboard/daily` - `date?`, `memberId?`
//! - `GET /api/v1/nutrition-dashboard/weekly` - `weekStart?`, `memberId?`
//! - `GET /api/v1/nutrition-dashboard/member-summary` - `date?`
//! - `GET /api/v1/nutrition-dashboard/health-metrics` - `memberId?`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use nourish::api::{serve, AppState};
//! use nourish::config::Config;
//! use nourish::services::{UpstreamClient, UpstreamConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let service = Arc::new(UpstreamClient::new(UpstreamConfig::from(&config.upstream))?);
//!     let api_config = config.api.clone();
//!
//!     serve(AppState::new(service, config), &api_config).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use auth::Actor;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    // Layers run bottom-up: authenticate, then rate limit, then the handler
    let dashboard_routes = Router::new()
        .route("/daily", get(routes::nutrition::daily))
        .route("/weekly", get(routes::nutrition::weekly))
        .route("/member-summary", get(routes::nutrition::member_summary))
        .route("/health-metrics", get(routes::nutrition::health_metrics))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            rate_limit::limit,
        ))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            auth::authenticate,
        ));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&shared_state.config.api.cors_origins);

    Router::new()
        .nest("/api/v1/nutrition-dashboard", dashboard_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Nourish API listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Nourish API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
