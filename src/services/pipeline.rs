use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::job::{JobId, JobStatus};
use crate::models::visit::{ProcessingRequest, VisitReport};
use crate::services::analysis::ImageAnalyzer;
use crate::services::executor::{JobExecutor, TerminalPolicy};
use crate::services::ids::JobIdGenerator;
use crate::services::intake::{Intake, IntakeError};
use crate::services::pool::WorkerPool;
use crate::services::queue::{EnqueuePolicy, JobQueue, QueueError};
use crate::services::store::JobStore;
use crate::services::store_master::StoreMaster;

/// Sizes and policies fixed when the pipeline starts.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    pub worker_count: usize,
    pub enqueue_policy: EnqueuePolicy,
    pub terminal_policy: TerminalPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 5,
            worker_count: 2,
            enqueue_policy: EnqueuePolicy::Block,
            terminal_policy: TerminalPolicy::AlwaysCompleted,
        }
    }
}

/// The running job pipeline: intake, queue, worker pool and shared store.
pub struct Pipeline {
    intake: Intake,
    queue: Arc<JobQueue>,
    store: Arc<JobStore>,
    master: Arc<StoreMaster>,
    pool: Mutex<Option<WorkerPool>>,
    worker_count: usize,
}

impl Pipeline {
    /// Build the pipeline and spawn its workers on the current runtime.
    pub fn start(
        settings: PipelineSettings,
        analyzer: Arc<dyn ImageAnalyzer>,
        ids: Arc<dyn JobIdGenerator>,
        master: StoreMaster,
    ) -> Result<Self, QueueError> {
        let store = Arc::new(JobStore::new());
        let queue = Arc::new(JobQueue::new(settings.queue_capacity, settings.enqueue_policy)?);
        let executor = Arc::new(JobExecutor::new(
            Arc::clone(&store),
            analyzer,
            settings.terminal_policy,
        ));
        let pool = WorkerPool::spawn(settings.worker_count, queue.receiver(), executor);
        let intake = Intake::new(Arc::clone(&queue), Arc::clone(&store), ids);

        tracing::info!(
            queue_capacity = settings.queue_capacity,
            workers = settings.worker_count,
            enqueue_policy = ?settings.enqueue_policy,
            terminal_policy = ?settings.terminal_policy,
            "Pipeline started"
        );

        Ok(Self {
            intake,
            queue,
            store,
            master: Arc::new(master),
            pool: Mutex::new(Some(pool)),
            worker_count: settings.worker_count,
        })
    }

    pub async fn submit(&self, request: ProcessingRequest) -> Result<JobId, IntakeError> {
        self.intake.submit(request).await
    }

    /// Current status of a job, `None` if the id was never accepted.
    pub fn status(&self, job_id: JobId) -> Option<JobStatus> {
        self.store.status(job_id)
    }

    /// Every stored result joined with its store's reference data, ordered by
    /// store id.
    pub fn list_results(&self) -> Vec<VisitReport> {
        self.store
            .results()
            .iter()
            .map(|result| VisitReport::from_result(result, self.master.lookup(&result.store_id)))
            .collect()
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Workers still running; drops to zero after shutdown.
    pub fn active_workers(&self) -> usize {
        self.pool.lock().as_ref().map(WorkerPool::active).unwrap_or(0)
    }

    /// Close the queue and wait for workers to drain it and exit.
    pub async fn shutdown(&self) {
        self.queue.close();
        let pool = self.pool.lock().take();
        if let Some(pool) = pool {
            pool.join().await;
        }
    }
}
