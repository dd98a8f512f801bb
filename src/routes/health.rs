use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::responses::LiveResponse;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub queue: QueueHealth,
    pub workers: WorkerHealth,
}

#[derive(Serialize)]
pub struct QueueHealth {
    pub status: String,
    /// Jobs still buffered; keeps counting down while a closed queue drains.
    pub depth: usize,
    pub capacity: usize,
}

#[derive(Serialize)]
pub struct WorkerHealth {
    pub status: String,
    pub active: usize,
    pub configured: usize,
}

fn component_status(ok: bool) -> String {
    let status = if ok { "ok" } else { "error" };
    status.to_string()
}

/// GET / — liveness banner.
pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        message: "API is Live".to_string(),
    })
}

/// GET /health — queue and worker pool status.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pipeline = &state.pipeline;
    let queue = pipeline.queue();

    let queue_ok = !queue.is_closed();
    let active = pipeline.active_workers();
    let workers_ok = active == pipeline.worker_count();

    let all_healthy = queue_ok && workers_ok;
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            queue: QueueHealth {
                status: component_status(queue_ok),
                depth: queue.depth(),
                capacity: queue.capacity(),
            },
            workers: WorkerHealth {
                status: component_status(workers_ok),
                active,
                configured: pipeline.worker_count(),
            },
        },
    };

    (status_code, Json(response))
}
