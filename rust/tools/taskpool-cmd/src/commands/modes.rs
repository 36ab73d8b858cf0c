//! The three pooled dispatch modes

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use taskpool::{Pool, Task, TaskResult, WorkerContext, task::outputs};

use super::PoolArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// All inputs in one bulk call
    Map,
    /// One blocking call per input
    Call,
    /// Submit everything, then wait on each handle
    Submit,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Map, Mode::Call, Mode::Submit];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Map => "Pool with map",
            Mode::Call => "Pool with apply",
            Mode::Submit => "Pool with apply_async",
        }
    }
}

/// Opens a fresh pool, runs `args`' inputs through it in `mode`, tears the
/// pool down and prints the results with the elapsed wall-clock time.
///
/// The time covers pool startup, dispatch and teardown.
pub fn run(mode: Mode, args: &PoolArgs) -> Result<Vec<TaskResult>> {
    let tasks = args.tasks()?;
    let start = Instant::now();

    let pool = Pool::with_config(args.pool_config()).context("Failed to open pool")?;
    tracing::info!(mode = ?mode, size = pool.size(), tasks = tasks.len(), "dispatching");

    let results = dispatch(mode, &pool, args, &tasks)
        .with_context(|| format!("{} failed", mode.label()))?;

    pool.close();
    pool.join().context("Failed to shut down pool")?;
    let elapsed = start.elapsed();

    report(mode.label(), &results, elapsed);
    Ok(results)
}

fn dispatch(
    mode: Mode,
    pool: &Pool,
    args: &PoolArgs,
    tasks: &[Task],
) -> taskpool::Result<Vec<TaskResult>> {
    let doubler = args.doubler();
    let execute = move |ctx: &WorkerContext, task: Task| doubler.execute(ctx, task);
    match mode {
        Mode::Map => pool.map_all(execute, tasks.iter().copied()),
        Mode::Call => tasks
            .iter()
            .map(|&task| pool.call_one(execute, task))
            .collect(),
        Mode::Submit => {
            let handles = tasks
                .iter()
                .map(|&task| pool.submit(execute, task))
                .collect::<taskpool::Result<Vec<_>>>()?;
            handles.iter().map(|handle| handle.wait()).collect()
        }
    }
}

pub fn report(label: &str, results: &[TaskResult], elapsed: Duration) {
    println!(
        "{label}: {:?} time: {:.4} s",
        outputs(results),
        elapsed.as_secs_f64()
    );
}
