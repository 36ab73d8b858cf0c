use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{PoolArgs, modes::Mode};

#[derive(Parser)]
#[command(name = "taskpool-cmd")]
#[command(about = "Compares sequential execution with a worker pool's dispatch modes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sequential baseline followed by all three pooled modes
    Run {
        #[command(flatten)]
        pool: PoolArgs,

        /// Do not run the sequential baseline
        #[arg(long)]
        skip_sequential: bool,
    },

    /// Bulk map: dispatch every input, wait for all results
    Map {
        #[command(flatten)]
        pool: PoolArgs,
    },

    /// Dispatch one input at a time and wait for each result
    Call {
        #[command(flatten)]
        pool: PoolArgs,
    },

    /// Submit every input without waiting, then collect the handles
    Submit {
        #[command(flatten)]
        pool: PoolArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pool,
            skip_sequential,
        } => commands::run::run(pool, skip_sequential),
        Commands::Map { pool } => commands::modes::run(Mode::Map, &pool).map(|_| ()),
        Commands::Call { pool } => commands::modes::run(Mode::Call, &pool).map(|_| ()),
        Commands::Submit { pool } => commands::modes::run(Mode::Submit, &pool).map(|_| ()),
    }
}
