pub mod health;
pub mod jobs;
pub mod metrics;
pub mod visits;

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Maximum accepted request body.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// API routes with the standard middleware stack. `/metrics` is attached by
/// the binary, which owns the Prometheus recorder.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::live))
        .route("/health", get(health::health_check))
        .route("/api/submit", post(jobs::submit_job))
        .route("/api/submit/", post(jobs::submit_job))
        .route("/api/status", get(jobs::get_job_status))
        .route("/api/visits", get(visits::list_visits))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
}
