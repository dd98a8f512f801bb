use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

use crate::models::visit::ProcessingRequest;

/// Identifier assigned to a job at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a submitted job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    Pending,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Error recorded against a single visit while its job was processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitError {
    pub store_id: String,
    #[serde(rename = "error")]
    pub message: String,
}

impl VisitError {
    pub fn new(store_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            message: message.into(),
        }
    }
}

/// Snapshot of a job's entry in the status table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatus {
    pub job_id: JobId,
    pub status: JobState,
    #[serde(rename = "error", default)]
    pub errors: Vec<VisitError>,
}

impl JobStatus {
    pub fn pending(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobState::Pending,
            errors: Vec::new(),
        }
    }
}

/// A unit of work sitting in the queue or owned by a worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub task: ProcessingRequest,
}
