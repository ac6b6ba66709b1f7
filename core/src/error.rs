use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("queue is closed")]
    Closed,

    #[error("operation abandoned before reaching an outcome")]
    Abandoned,

    #[error("failed to spawn worker: {0}")]
    Spawn(std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
