//! HTTP routes for the Media Gateway.
//!
//! Defines the Axum router and application state.

use crate::clients::{EgressClient, RoomClient};
use crate::config::Config;
use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
///
/// Built once at startup; the configured key pair and clients are injected
/// here rather than read from ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Room directory client.
    pub room_client: RoomClient,

    /// Egress controller client.
    pub egress_client: EgressClient,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `POST /v1/token` - Issue access token
/// - `POST /v1/egress/start` - Start composite recording
/// - `POST /v1/egress/stop` - Stop recording by identifier
/// - `GET /v1/health` - Liveness check
/// - TraceLayer for request logging, permissive CORS, 30 second timeout
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/token", post(handlers::tokens::issue_token))
        .route("/v1/egress/start", post(handlers::egress::start_egress))
        .route("/v1/egress/stop", post(handlers::egress::stop_egress))
        .route("/v1/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

/// Build the operational routes (Prometheus scrape endpoint).
///
/// Kept separate from [`build_routes`] so tests can assemble the API router
/// without installing a process-global metrics recorder.
pub fn metrics_routes(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .with_state(handle)
}
