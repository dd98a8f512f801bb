use axum::extract::State;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::services::pipeline::Pipeline;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: Arc<PrometheusHandle>,
    pub pipeline: Arc<Pipeline>,
}

/// `/metrics` on its own router, since it carries the Prometheus handle.
pub fn router(state: MetricsState) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(state)
}

/// GET /metrics — Prometheus text exposition, with queue gauges sampled at
/// scrape time.
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> String {
    let queue = state.pipeline.queue();
    metrics::gauge!("visit_queue_depth").set(queue.depth() as f64);
    metrics::gauge!("visit_workers_active").set(state.pipeline.active_workers() as f64);
    state.handle.render()
}
