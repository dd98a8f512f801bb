use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::models::job::JobId;

/// Source of job identifiers.
pub trait JobIdGenerator: Send + Sync {
    fn next_id(&self) -> JobId;
}

/// Takes the leading 32 bits of a random v4 UUID, skipping zero.
#[derive(Debug, Default)]
pub struct RandomJobIds;

impl JobIdGenerator for RandomJobIds {
    fn next_id(&self) -> JobId {
        loop {
            let bytes = Uuid::new_v4().into_bytes();
            let id = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            if id != 0 {
                return JobId(id);
            }
        }
    }
}

/// Hands out 1, 2, 3, ...
#[derive(Debug)]
pub struct SequentialJobIds {
    next: AtomicU32,
}

impl SequentialJobIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }
}

impl Default for SequentialJobIds {
    fn default() -> Self {
        Self::new()
    }
}

impl JobIdGenerator for SequentialJobIds {
    fn next_id(&self) -> JobId {
        JobId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
