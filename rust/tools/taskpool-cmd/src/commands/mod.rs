//! Command implementations for taskpool-cmd

use anyhow::{Context, Result};
use clap::Args;
use taskpool::{Doubler, PoolConfig, Task, TimeUnit, announce_startup, task::tasks_from};

pub mod modes;
pub mod run;

/// Options shared by every command that opens a pool.
#[derive(Args, Debug, Clone)]
pub struct PoolArgs {
    /// Number of workers (defaults to the number of logical processors)
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Comma-separated, non-negative task inputs
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "0,1,2,3,4",
        allow_negative_numbers = true
    )]
    pub inputs: Vec<i64>,

    /// Length of one unit of simulated delay, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub time_unit_ms: u64,
}

impl PoolArgs {
    pub fn pool_config(&self) -> PoolConfig {
        let config = PoolConfig::default().with_initializer(announce_startup);
        match self.size {
            Some(size) => config.with_size(size),
            None => config,
        }
    }

    pub fn doubler(&self) -> Doubler {
        Doubler::new(TimeUnit::from_millis(self.time_unit_ms))
    }

    /// Parses the inputs and checks that the doubler can run each of them.
    pub fn tasks(&self) -> Result<Vec<Task>> {
        let doubler = self.doubler();
        let tasks = tasks_from(&self.inputs).context("Invalid task inputs")?;
        for &task in &tasks {
            doubler.verify(task).context("Invalid task inputs")?;
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        pool: PoolArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.pool.inputs, vec![0, 1, 2, 3, 4]);
        assert_eq!(cli.pool.time_unit_ms, 1000);
        assert_eq!(cli.pool.pool_config().size(), taskpool::default_pool_size());
    }

    #[test]
    fn test_explicit_values() {
        let cli = TestCli::parse_from([
            "test",
            "--size",
            "3",
            "--inputs",
            "4,2",
            "--time-unit-ms",
            "5",
        ]);
        assert_eq!(cli.pool.pool_config().size(), 3);
        assert_eq!(cli.pool.tasks().unwrap(), vec![Task::from(4), Task::from(2)]);
        assert_eq!(cli.pool.doubler().unit(), TimeUnit::from_millis(5));
    }

    #[test]
    fn test_negative_input_is_an_error() {
        let cli = TestCli::parse_from(["test", "--inputs", "1,-2"]);
        assert!(cli.pool.tasks().is_err());
    }
}
