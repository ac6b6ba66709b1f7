use crate::error::CliError;
use crate::utils::{DEFAULT_CAPACITY, QueueOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tarry_core::{BoundedAsyncQueue, Completion, PopOutcome, PushOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Push(i64),
    Pop,
}

impl FromStr for Op {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pop") {
            return Ok(Op::Pop);
        }
        s.strip_prefix("push=")
            .and_then(|value| value.parse().ok())
            .map(Op::Push)
            .ok_or_else(|| CliError::InvalidOp(s.to_string()))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Push(value) => write!(f, "push({})", value),
            Op::Pop => f.write_str("pop()"),
        }
    }
}

enum Pending {
    Push(i64, Completion<PushOutcome<i64>>),
    Pop(Completion<PopOutcome<i64>>),
}

/// Count observed after one settled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub op: Op,
    pub count: usize,
}

/// Final state of one submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pushed(i64),
    PushDropped(i64),
    Popped(i64),
    PopDropped,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Pushed(value) => write!(f, "push({}) committed", value),
            Resolution::PushDropped(value) => write!(f, "push({}) dropped", value),
            Resolution::Popped(value) => write!(f, "pop() committed, removed {}", value),
            Resolution::PopDropped => f.write_str("pop() dropped"),
        }
    }
}

/// Submits `ops` one at a time, sleeping `settle` after each before reading
/// the count, then waits for every operation to reach its outcome.
pub async fn execute(
    queue: &BoundedAsyncQueue<i64>,
    ops: &[Op],
    settle: Duration,
) -> Result<(Vec<Step>, Vec<Resolution>), CliError> {
    let mut pending = Vec::with_capacity(ops.len());
    let mut steps = Vec::with_capacity(ops.len());

    for &op in ops {
        match op {
            Op::Push(value) => pending.push(Pending::Push(value, queue.push(value)?)),
            Op::Pop => pending.push(Pending::Pop(queue.pop()?)),
        }
        tokio::time::sleep(settle).await;
        steps.push(Step {
            op,
            count: queue.len(),
        });
    }

    let mut resolutions = Vec::with_capacity(pending.len());
    for entry in pending {
        let resolution = match entry {
            Pending::Push(value, completion) => match completion.await? {
                PushOutcome::Committed => Resolution::Pushed(value),
                PushOutcome::Dropped(value) => Resolution::PushDropped(value),
            },
            Pending::Pop(completion) => match completion.await? {
                PopOutcome::Committed(value) => Resolution::Popped(value),
                PopOutcome::Dropped => Resolution::PopDropped,
            },
        };
        resolutions.push(resolution);
    }

    Ok((steps, resolutions))
}

pub async fn run_ops(options: &QueueOptions, settle_ms: u64, ops: Vec<Op>) -> Result<(), CliError> {
    let config = options.resolve(DEFAULT_CAPACITY)?;
    let queue = BoundedAsyncQueue::with_config(config)?;

    let (steps, resolutions) = execute(&queue, &ops, Duration::from_millis(settle_ms)).await?;

    for step in &steps {
        println!("{:<12} count={}/{}", step.op.to_string(), step.count, queue.capacity());
    }

    println!();
    println!("Outcomes:");
    for resolution in &resolutions {
        println!("  {}", resolution);
    }
    print_summary(&queue);

    Ok(())
}

pub fn print_summary(queue: &BoundedAsyncQueue<i64>) {
    let stats = queue.stats();
    println!();
    println!("Final count: {}/{}", queue.len(), queue.capacity());
    println!(
        "  Pushes: {} committed, {} dropped",
        stats.pushes_committed, stats.pushes_dropped
    );
    println!(
        "  Pops:   {} committed, {} dropped",
        stats.pops_committed, stats.pops_dropped
    );
}
