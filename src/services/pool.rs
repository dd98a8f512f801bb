use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::models::job::{JobState, VisitError};
use crate::services::executor::JobExecutor;
use crate::services::queue::JobReceiver;

/// Fixed set of workers, each running one job at a time.
///
/// Workers exit once the queue is closed and drained; they are never
/// restarted.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(size: usize, receiver: JobReceiver, executor: Arc<JobExecutor>) -> Self {
        let handles = (1..=size)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let executor = Arc::clone(&executor);
                tokio::spawn(run_worker(worker_id, receiver, executor))
            })
            .collect();

        tracing::info!(workers = size, "Worker pool started");
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Number of workers still running.
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every worker to exit. Only returns after the queue is closed.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task ended abnormally");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}

async fn run_worker(worker_id: usize, receiver: JobReceiver, executor: Arc<JobExecutor>) {
    tracing::debug!(worker_id, "Worker ready");

    while let Some(job) = receiver.recv().await {
        let job_id = job.id;
        metrics::gauge!("visit_jobs_in_flight").increment(1.0);

        // Run in its own task so a panicking job cannot take the worker down.
        let task = {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move { executor.execute(job).await })
        };

        match task.await {
            Ok(outcome) => {
                tracing::debug!(
                    worker_id,
                    job_id = %job_id,
                    state = %outcome.state,
                    "Worker finished job"
                );
            }
            Err(e) => {
                tracing::error!(worker_id, job_id = %job_id, error = %e, "Job aborted");
                metrics::counter!("visit_jobs_failed_total").increment(1);
                executor.store().finish(
                    job_id,
                    JobState::Failed,
                    vec![VisitError::new("", format!("job aborted: {e}"))],
                );
            }
        }

        metrics::gauge!("visit_jobs_in_flight").decrement(1.0);
    }

    tracing::info!(worker_id, "Job queue closed, worker exiting");
}
