use std::sync::Arc;

use crate::models::job::{Job, JobId};
use crate::models::visit::ProcessingRequest;
use crate::services::ids::JobIdGenerator;
use crate::services::queue::{JobQueue, QueueError};
use crate::services::store::JobStore;
use crate::services::validation::{validate_request, ValidationError};

/// Accepts batch submissions and hands them to the queue.
pub struct Intake {
    queue: Arc<JobQueue>,
    store: Arc<JobStore>,
    ids: Arc<dyn JobIdGenerator>,
}

impl Intake {
    pub fn new(
        queue: Arc<JobQueue>,
        store: Arc<JobStore>,
        ids: Arc<dyn JobIdGenerator>,
    ) -> Self {
        Self { queue, store, ids }
    }

    /// Validate, register as pending, and enqueue.
    ///
    /// The pending entry is written before the job becomes visible to workers,
    /// so a fast worker can never have its terminal status overwritten. If the
    /// job does not make it into the queue (rejected, timed out, closed, or the
    /// caller went away while blocked) the entry is removed again.
    pub async fn submit(&self, request: ProcessingRequest) -> Result<JobId, IntakeError> {
        if let Err(e) = validate_request(&request) {
            metrics::counter!("visit_jobs_rejected_total").increment(1);
            tracing::info!(error = %e, "Rejected submission");
            return Err(e.into());
        }

        let job_id = self.ids.next_id();
        let visits = request.visits.len();
        let pending = PendingEntry::register(&self.store, job_id);

        if let Err(e) = self.queue.enqueue(Job { id: job_id, task: request }).await {
            metrics::counter!("visit_jobs_rejected_total").increment(1);
            tracing::warn!(job_id = %job_id, error = %e, "Could not enqueue job");
            return Err(e.into());
        }
        pending.keep();

        metrics::counter!("visit_jobs_submitted_total").increment(1);
        tracing::info!(job_id = %job_id, visits, "Job accepted");
        Ok(job_id)
    }
}

/// Pending status that is rolled back on drop unless kept.
struct PendingEntry<'a> {
    store: &'a JobStore,
    job_id: JobId,
    keep: bool,
}

impl<'a> PendingEntry<'a> {
    fn register(store: &'a JobStore, job_id: JobId) -> Self {
        store.insert_pending(job_id);
        Self {
            store,
            job_id,
            keep: false,
        }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if !self.keep {
            self.store.remove_status(self.job_id);
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
