//! Fixed-capacity FIFO queue with asynchronous, bounded-wait push and pop.

mod completion;
mod config;
mod error;
mod pool;
mod queue;
mod store;
mod types;

pub use completion::Completion;
pub use config::{DEFAULT_WAIT_BOUND_MS, DEFAULT_WORKERS, QueueConfig};
pub use error::QueueError;
pub use queue::BoundedAsyncQueue;
pub use types::*;
