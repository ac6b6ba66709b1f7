use crate::commands::run::{Op, execute, print_summary};
use crate::error::CliError;
use crate::utils::QueueOptions;
use std::time::Duration;
use tarry_core::BoundedAsyncQueue;

/// The reference scenario on a capacity-2 queue, with the count expected after
/// each settled step (assuming the settle time is well under the wait bound).
pub const SCENARIO: [(Op, usize); 10] = [
    (Op::Push(1), 1),
    (Op::Pop, 0),
    (Op::Push(2), 1),
    (Op::Push(3), 2),
    (Op::Push(4), 2),
    (Op::Pop, 2),
    (Op::Pop, 1),
    (Op::Pop, 0),
    (Op::Pop, 0),
    (Op::Push(5), 0),
];

const DEMO_CAPACITY: usize = 2;

pub async fn run_demo(options: &QueueOptions, settle_ms: u64) -> Result<(), CliError> {
    let config = options.resolve(DEMO_CAPACITY)?;
    let settle = Duration::from_millis(settle_ms);
    if settle >= config.wait_bound() {
        tracing::warn!(
            settle_ms,
            wait_bound_ms = config.wait_bound_ms,
            "Settle time reaches the wait bound; observed counts will differ from expected"
        );
    }

    let queue = BoundedAsyncQueue::with_config(config)?;
    let ops: Vec<Op> = SCENARIO.iter().map(|(op, _)| *op).collect();
    let (steps, resolutions) = execute(&queue, &ops, settle).await?;

    let mut mismatches = 0;
    for (step, (_, expected)) in steps.iter().zip(SCENARIO.iter()) {
        let marker = if step.count == *expected {
            "ok"
        } else {
            mismatches += 1;
            "MISMATCH"
        };
        println!(
            "{:<12} count={} expected={} {}",
            step.op.to_string(),
            step.count,
            expected,
            marker
        );
    }

    println!();
    println!("Outcomes:");
    for resolution in &resolutions {
        println!("  {}", resolution);
    }
    print_summary(&queue);

    if mismatches > 0 {
        println!("{} step(s) differed from the expected count", mismatches);
    }

    Ok(())
}
