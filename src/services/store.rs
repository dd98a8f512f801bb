use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

use crate::models::job::{JobId, JobState, JobStatus, VisitError};
use crate::models::visit::ProcessedResult;

#[derive(Default)]
struct Tables {
    /// Keyed by store id; ordered so listings are deterministic.
    results: BTreeMap<String, ProcessedResult>,
    statuses: HashMap<JobId, JobStatus>,
}

/// In-memory result store and status table behind a single lock.
///
/// Both maps live for the whole process and are never evicted. Every read and
/// write takes the same mutex, so a status read can never interleave with a
/// half-applied result commit.
#[derive(Default)]
pub struct JobStore {
    tables: Mutex<Tables>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly accepted job as pending.
    pub fn insert_pending(&self, job_id: JobId) {
        self.tables
            .lock()
            .statuses
            .insert(job_id, JobStatus::pending(job_id));
    }

    /// Drop a status entry, used to undo intake when enqueueing fails.
    pub fn remove_status(&self, job_id: JobId) -> Option<JobStatus> {
        self.tables.lock().statuses.remove(&job_id)
    }

    /// Mark the job failed with a single visit error, replacing earlier errors.
    pub fn record_visit_failure(&self, job_id: JobId, error: VisitError) {
        self.tables.lock().statuses.insert(
            job_id,
            JobStatus {
                job_id,
                status: JobState::Failed,
                errors: vec![error],
            },
        );
    }

    /// Store the result for a store id, overwriting any previous one.
    pub fn commit_result(&self, result: ProcessedResult) -> Option<ProcessedResult> {
        self.tables
            .lock()
            .results
            .insert(result.store_id.clone(), result)
    }

    /// Write the terminal status for a job.
    pub fn finish(&self, job_id: JobId, state: JobState, errors: Vec<VisitError>) {
        self.tables.lock().statuses.insert(
            job_id,
            JobStatus {
                job_id,
                status: state,
                errors,
            },
        );
    }

    pub fn status(&self, job_id: JobId) -> Option<JobStatus> {
        self.tables.lock().statuses.get(&job_id).cloned()
    }

    pub fn result(&self, store_id: &str) -> Option<ProcessedResult> {
        self.tables.lock().results.get(store_id).cloned()
    }

    /// All current results, ordered by store id.
    pub fn results(&self) -> Vec<ProcessedResult> {
        self.tables.lock().results.values().cloned().collect()
    }

    pub fn job_count(&self) -> usize {
        self.tables.lock().statuses.len()
    }
}
