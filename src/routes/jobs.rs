use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::job::{JobId, JobStatus};
use crate::models::responses::{StatusQuery, SubmitResponse};
use crate::models::visit::ProcessingRequest;

/// POST /api/submit — accept a batch of store visits for processing.
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<ProcessingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let job_id = state.pipeline.submit(request).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { job_id })))
}

/// GET /api/status?jobid=<id> — current status of a submitted job.
pub async fn get_job_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<JobStatus>> {
    let raw = query
        .jobid
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing job id parameter".to_string()))?;
    let job_id = raw
        .parse::<u32>()
        .map(JobId)
        .map_err(|_| AppError::BadRequest(format!("Invalid job id: {raw}")))?;

    state
        .pipeline
        .status(job_id)
        .map(Json)
        .ok_or(AppError::JobNotFound(job_id))
}
