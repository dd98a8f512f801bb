use serde::{Deserialize, Serialize};

use crate::models::job::JobId;

/// Response after a batch has been accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

/// Query string for `GET /api/status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub jobid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LiveResponse {
    pub message: String,
}
