mod commands;
mod error;
mod utils;

use clap::{Parser, Subcommand};
use commands::{Op, run_demo, run_ops};
use tracing_subscriber::EnvFilter;
use utils::QueueOptions;

#[derive(Parser)]
#[command(name = "tarry")]
#[command(about = "Drive a bounded asynchronous queue from the command line")]
struct Cli {
    #[command(flatten)]
    queue: QueueOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference push/pop scenario on a capacity-2 queue
    Demo {
        /// Pause after each submission before reading the count
        #[arg(long, default_value_t = 500)]
        settle_ms: u64,
    },
    /// Submit operations in order and report the count after each
    Run {
        /// Pause after each submission before reading the count
        #[arg(long, default_value_t = 500)]
        settle_ms: u64,

        /// Operations: `push=<int>` or `pop`
        #[arg(required = true)]
        ops: Vec<Op>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { settle_ms } => {
            run_demo(&cli.queue, settle_ms).await?;
        }
        Commands::Run { settle_ms, ops } => {
            run_ops(&cli.queue, settle_ms, ops).await?;
        }
    }

    Ok(())
}
