use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::models::job::{Job, JobId, JobState, VisitError};
use crate::models::visit::{ProcessedImage, ProcessedResult, Visit};
use crate::services::analysis::ImageAnalyzer;
use crate::services::store::JobStore;

pub const EMPTY_STORE_ID: &str = "Store ID is empty";

/// How a finished job's terminal state is derived from its visit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// Every job that runs to the end is `Completed`, and the error list is
    /// cleared, even if some visits failed along the way.
    #[default]
    AlwaysCompleted,
    /// Any visit error makes the job `Failed` and keeps the errors.
    FailOnVisitError,
}

impl TerminalPolicy {
    pub fn resolve(&self, visit_errors: &[VisitError]) -> (JobState, Vec<VisitError>) {
        match self {
            TerminalPolicy::AlwaysCompleted => (JobState::Completed, Vec::new()),
            TerminalPolicy::FailOnVisitError if visit_errors.is_empty() => {
                (JobState::Completed, Vec::new())
            }
            TerminalPolicy::FailOnVisitError => (JobState::Failed, visit_errors.to_vec()),
        }
    }
}

/// Summary of one executed job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub state: JobState,
    pub visit_errors: Vec<VisitError>,
    pub results_committed: usize,
}

/// Runs a job's visits in order and commits results and status to the store.
pub struct JobExecutor {
    store: Arc<JobStore>,
    analyzer: Arc<dyn ImageAnalyzer>,
    policy: TerminalPolicy,
}

impl JobExecutor {
    pub fn new(
        store: Arc<JobStore>,
        analyzer: Arc<dyn ImageAnalyzer>,
        policy: TerminalPolicy,
    ) -> Self {
        Self {
            store,
            analyzer,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub async fn execute(&self, job: Job) -> JobOutcome {
        let started = Instant::now();
        let mut visit_errors = Vec::new();
        let mut results_committed = 0;

        tracing::info!(job_id = %job.id, visits = job.task.visits.len(), "Processing job");

        for visit in &job.task.visits {
            if visit.store_id.is_empty() {
                tracing::warn!(job_id = %job.id, "Visit has an empty store id, skipping");
                self.fail_visit(job.id, VisitError::new("", EMPTY_STORE_ID), &mut visit_errors);
                continue;
            }

            let result = self.process_visit(job.id, visit, &mut visit_errors).await;
            self.store.commit_result(result);
            results_committed += 1;
        }

        let (state, errors) = self.policy.resolve(&visit_errors);
        self.store.finish(job.id, state, errors);

        let elapsed = started.elapsed();
        metrics::histogram!("visit_job_processing_seconds").record(elapsed.as_secs_f64());
        match state {
            JobState::Failed => metrics::counter!("visit_jobs_failed_total").increment(1),
            _ => metrics::counter!("visit_jobs_completed_total").increment(1),
        }

        tracing::info!(
            job_id = %job.id,
            state = %state,
            visit_errors = visit_errors.len(),
            results_committed,
            duration_ms = elapsed.as_millis() as u64,
            "Job finished"
        );

        JobOutcome {
            job_id: job.id,
            state,
            visit_errors,
            results_committed,
        }
    }

    async fn process_visit(
        &self,
        job_id: JobId,
        visit: &Visit,
        visit_errors: &mut Vec<VisitError>,
    ) -> ProcessedResult {
        let mut processed_images = Vec::with_capacity(visit.image_urls.len());

        for image_url in &visit.image_urls {
            match self.analyzer.analyze(image_url).await {
                Ok(perimeter) => {
                    tracing::debug!(
                        job_id = %job_id,
                        store_id = %visit.store_id,
                        image_url = %image_url,
                        perimeter,
                        "Image analysed"
                    );
                    processed_images.push(ProcessedImage {
                        image_url: image_url.clone(),
                        perimeter,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %job_id,
                        store_id = %visit.store_id,
                        image_url = %image_url,
                        error = %e,
                        "Image analysis failed"
                    );
                    self.fail_visit(
                        job_id,
                        VisitError::new(visit.store_id.clone(), e.to_string()),
                        visit_errors,
                    );
                }
            }
        }

        ProcessedResult {
            store_id: visit.store_id.clone(),
            processed_images,
            visit_time: parse_visit_time(job_id, &visit.store_id, &visit.visit_time),
        }
    }

    fn fail_visit(&self, job_id: JobId, error: VisitError, visit_errors: &mut Vec<VisitError>) {
        self.store.record_visit_failure(job_id, error.clone());
        visit_errors.push(error);
    }
}

/// Parse an RFC 3339 visit time; a malformed value is logged and dropped.
fn parse_visit_time(job_id: JobId, store_id: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(
                job_id = %job_id,
                store_id,
                visit_time = raw,
                error = %e,
                "Unparseable visit time"
            );
            None
        }
    }
}
