use crate::error::QueueError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How long an operation waits for its predicate when nothing else is said.
pub const DEFAULT_WAIT_BOUND_MS: u64 = 2000;

/// Worker threads per lane (one lane for pushes, one for pops).
pub const DEFAULT_WORKERS: usize = 16;

/// Settings for a [`BoundedAsyncQueue`](crate::BoundedAsyncQueue).
///
/// Only `capacity` is required when deserializing; the rest fall back to the
/// defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub capacity: usize,
    #[serde(default = "default_wait_bound_ms")]
    pub wait_bound_ms: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_wait_bound_ms() -> u64 {
    DEFAULT_WAIT_BOUND_MS
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl QueueConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            wait_bound_ms: DEFAULT_WAIT_BOUND_MS,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_wait_bound(mut self, bound: Duration) -> Self {
        self.wait_bound_ms = bound.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn wait_bound(&self) -> Duration {
        Duration::from_millis(self.wait_bound_ms)
    }

    /// Rejects settings the queue cannot run with.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.capacity == 0 {
            return Err(QueueError::InvalidCapacity(self.capacity));
        }
        if self.workers == 0 {
            return Err(QueueError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(data: &str) -> Result<Self, QueueError> {
        let config: QueueConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
