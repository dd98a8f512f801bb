use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::sync::{mpsc, Mutex};

use crate::models::job::Job;

/// What a producer does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnqueuePolicy {
    /// Wait until a slot frees up.
    #[default]
    Block,
    /// Fail immediately with [`QueueError::Full`].
    Reject,
    /// Wait at most this long, then fail with [`QueueError::Timeout`].
    Timeout(Duration),
}

/// Configuration name of an [`EnqueuePolicy`], as read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnqueuePolicyKind {
    #[default]
    Block,
    Reject,
    Timeout,
}

impl EnqueuePolicyKind {
    pub fn into_policy(self, timeout: Duration) -> EnqueuePolicy {
        match self {
            EnqueuePolicyKind::Block => EnqueuePolicy::Block,
            EnqueuePolicyKind::Reject => EnqueuePolicy::Reject,
            EnqueuePolicyKind::Timeout => EnqueuePolicy::Timeout(timeout),
        }
    }
}

/// Bounded FIFO of pending jobs shared by intake and the worker pool.
///
/// Closing drops the queue's sender: jobs already buffered are still handed
/// out, after which every receiver observes `None`.
pub struct JobQueue {
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    receiver: JobReceiver,
    capacity: usize,
    policy: EnqueuePolicy,
}

/// Buffered job count, shared by both ends of the channel.
///
/// Signed because a worker can receive a job before the producer records it.
#[derive(Clone, Default)]
struct Depth(Arc<AtomicIsize>);

impl Depth {
    fn add(&self) {
        let depth = self.0.fetch_add(1, Ordering::AcqRel) + 1;
        metrics::gauge!("visit_queue_depth").set(depth.max(0) as f64);
    }

    fn sub(&self) {
        let depth = self.0.fetch_sub(1, Ordering::AcqRel) - 1;
        metrics::gauge!("visit_queue_depth").set(depth.max(0) as f64);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Acquire).max(0) as usize
    }
}

impl JobQueue {
    pub fn new(capacity: usize, policy: EnqueuePolicy) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }

        let (tx, rx) = mpsc::channel(capacity);
        Ok(Self {
            sender: RwLock::new(Some(tx)),
            receiver: JobReceiver {
                inner: Arc::new(Mutex::new(rx)),
                depth: Depth::default(),
            },
            capacity,
            policy,
        })
    }

    /// Push a job according to the configured policy.
    pub async fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        // Clone out so the lock is not held across the await.
        let sender = self.sender.read().clone().ok_or(QueueError::Closed)?;

        let result = match self.policy {
            EnqueuePolicy::Block => sender.send(job).await.map_err(|_| QueueError::Closed),
            EnqueuePolicy::Reject => sender.try_send(job).map_err(|e| match e {
                TrySendError::Full(_) => QueueError::Full,
                TrySendError::Closed(_) => QueueError::Closed,
            }),
            EnqueuePolicy::Timeout(wait) => {
                sender.send_timeout(job, wait).await.map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => QueueError::Timeout(wait),
                    SendTimeoutError::Closed(_) => QueueError::Closed,
                })
            }
        };

        if result.is_ok() {
            self.receiver.depth.add();
        }
        result
    }

    /// Handle for consumers. All clones share one underlying receiver.
    pub fn receiver(&self) -> JobReceiver {
        self.receiver.clone()
    }

    /// Stop accepting jobs. Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        let was_open = self.sender.write().take().is_some();
        if was_open {
            tracing::info!("Job queue closed");
        }
        was_open
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Jobs currently buffered, including ones still draining after close.
    pub fn depth(&self) -> usize {
        self.receiver.depth.get()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer side of the [`JobQueue`].
#[derive(Clone)]
pub struct JobReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Job>>>,
    depth: Depth,
}

impl JobReceiver {
    /// Wait for the next job. `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<Job> {
        let job = self.inner.lock().await.recv().await;
        if job.is_some() {
            self.depth.sub();
        }
        job
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("job queue is full")]
    Full,

    #[error("job queue did not free up within {0:?}")]
    Timeout(Duration),

    #[error("job queue is closed")]
    Closed,

    #[error("job queue capacity must be at least 1")]
    InvalidCapacity,
}
