//! Test helpers: deterministic analyzers and status polling

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use store_visits::models::job::{JobId, JobStatus};
use store_visits::services::analysis::{AnalysisError, ImageAnalyzer};
use store_visits::services::executor::TerminalPolicy;
use store_visits::services::ids::SequentialJobIds;
use store_visits::services::pipeline::{Pipeline, PipelineSettings};
use store_visits::services::queue::EnqueuePolicy;
use store_visits::services::store::JobStore;

use crate::fixtures;

/// Returns a fixed perimeter after a short delay and records how many
/// analyses ran at the same time.
pub struct CountingAnalyzer {
    pub perimeter: f64,
    pub delay: Duration,
    current: AtomicUsize,
    pub max_concurrent: AtomicUsize,
    pub calls: AtomicUsize,
}

impl CountingAnalyzer {
    pub fn new(perimeter: f64, delay: Duration) -> Self {
        Self {
            perimeter,
            delay,
            current: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageAnalyzer for CountingAnalyzer {
    async fn analyze(&self, _image_url: &str) -> Result<f64, AnalysisError> {
        let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(running, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(self.perimeter)
    }
}

/// Blocks every analysis until the test releases a permit.
pub struct GatedAnalyzer {
    pub gate: Semaphore,
}

impl GatedAnalyzer {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
        }
    }

    pub fn release(&self, images: usize) {
        self.gate.add_permits(images);
    }
}

#[async_trait]
impl ImageAnalyzer for GatedAnalyzer {
    async fn analyze(&self, _image_url: &str) -> Result<f64, AnalysisError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AnalysisError::Failed(e.to_string()))?;
        permit.forget();
        Ok(50.0)
    }
}

/// Captures the job's status every time an image is analysed.
pub struct StatusRecorder {
    pub store: Arc<JobStore>,
    pub job_id: JobId,
    pub seen: parking_lot::Mutex<Vec<Option<JobStatus>>>,
}

#[async_trait]
impl ImageAnalyzer for StatusRecorder {
    async fn analyze(&self, image_url: &str) -> Result<f64, AnalysisError> {
        self.seen.lock().push(self.store.status(self.job_id));
        Ok(image_url.len() as f64)
    }
}

pub fn settings(queue_capacity: usize, worker_count: usize) -> PipelineSettings {
    PipelineSettings {
        queue_capacity,
        worker_count,
        enqueue_policy: EnqueuePolicy::Block,
        terminal_policy: TerminalPolicy::AlwaysCompleted,
    }
}

pub fn start_pipeline(settings: PipelineSettings, analyzer: Arc<dyn ImageAnalyzer>) -> Pipeline {
    Pipeline::start(
        settings,
        analyzer,
        Arc::new(SequentialJobIds::new()),
        fixtures::store_master(),
    )
    .expect("pipeline starts")
}

/// Poll until the job reaches a terminal state (with timeout).
pub async fn wait_for_terminal(pipeline: &Pipeline, job_id: JobId, timeout: Duration) -> JobStatus {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(status) = pipeline.status(job_id) {
            if status.status.is_terminal() {
                return status;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} did not finish within {timeout:?}"
        );
        sleep(Duration::from_millis(10)).await;
    }
}
