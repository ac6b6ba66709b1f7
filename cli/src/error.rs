use tarry_core::QueueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("invalid operation '{0}': expected push=<int> or pop")]
    InvalidOp(String),
}
