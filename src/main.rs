use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use store_visits::{
    app_state::AppState,
    config::AppConfig,
    routes::{self, metrics::MetricsState},
    services::{
        analysis::SimulatedAnalyzer, ids::RandomJobIds, pipeline::Pipeline,
        store_master::StoreMaster,
    },
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing store-visits server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("visit_jobs_submitted_total", "Jobs accepted at intake");
    metrics::describe_counter!(
        "visit_jobs_rejected_total",
        "Submissions rejected by validation or a full/closed queue"
    );
    metrics::describe_counter!("visit_jobs_completed_total", "Jobs finished as completed");
    metrics::describe_counter!("visit_jobs_failed_total", "Jobs finished as failed");
    metrics::describe_gauge!("visit_queue_depth", "Jobs waiting in the queue");
    metrics::describe_gauge!("visit_jobs_in_flight", "Jobs currently being processed");
    metrics::describe_gauge!("visit_workers_active", "Workers still running");
    metrics::describe_histogram!(
        "visit_job_processing_seconds",
        "Time to process one job"
    );

    let store_master = StoreMaster::from_path(&config.store_master_path)
        .expect("Failed to load store master data");

    let pipeline = Pipeline::start(
        config.pipeline_settings(),
        Arc::new(SimulatedAnalyzer::new(config.analysis_delay())),
        Arc::new(RandomJobIds),
        store_master,
    )
    .expect("Failed to start job pipeline");
    let state = AppState::new(pipeline);

    let metrics_state = MetricsState {
        handle: prometheus_handle,
        pipeline: Arc::clone(&state.pipeline),
    };
    let app = routes::router(state.clone()).merge(routes::metrics::router(metrics_state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("HTTP server stopped, draining job queue");
    state.pipeline.shutdown().await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
