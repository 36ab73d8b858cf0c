//! Run command implementation

use std::time::Instant;

use anyhow::Result;
use taskpool::{TaskResult, WorkerContext, task::outputs};

use super::{
    PoolArgs,
    modes::{self, Mode},
};

const SEPARATOR: &str = "*************";

/// Runs the sequential baseline and then every pooled mode on a fresh pool.
///
/// Fails as soon as one mode fails, and also if a mode disagrees with the
/// baseline.
pub fn run(args: PoolArgs, skip_sequential: bool) -> Result<()> {
    let tasks = args.tasks()?;
    println!("Input   : {:?}", args.inputs);

    let baseline = if skip_sequential {
        None
    } else {
        let start = Instant::now();
        let results = args.doubler().map_sequential(&tasks)?;
        modes::report("Built-in", &results, start.elapsed());
        Some(results)
    };

    let main = WorkerContext::main_thread();
    println!("Main process: Name: {}, ID: {}", main.name(), main.pid());

    for (i, mode) in Mode::ALL.into_iter().enumerate() {
        if i > 0 {
            println!("{SEPARATOR}");
        }
        let results = modes::run(mode, &args)?;
        check_against_baseline(mode, &results, baseline.as_deref())?;
    }
    Ok(())
}

fn check_against_baseline(
    mode: Mode,
    results: &[TaskResult],
    baseline: Option<&[TaskResult]>,
) -> Result<()> {
    match baseline {
        Some(expected) if expected != results => anyhow::bail!(
            "{} produced {:?}, sequential run produced {:?}",
            mode.label(),
            outputs(results),
            outputs(expected)
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpool::Task;

    fn args(inputs: Vec<i64>) -> PoolArgs {
        PoolArgs {
            size: Some(3),
            inputs,
            time_unit_ms: 2,
        }
    }

    #[test]
    fn test_run_all_modes() {
        run(args(vec![0, 1, 2, 3, 4]), false).unwrap();
        run(args(vec![4, 4]), true).unwrap();
    }

    #[test]
    fn test_run_rejects_negative_inputs() {
        assert!(run(args(vec![1, -1]), false).is_err());
    }

    #[test]
    fn test_run_rejects_out_of_range_delay() {
        let mut slow = args(vec![1, i64::MAX]);
        slow.time_unit_ms = 100_000;
        let err = run(slow, false).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid task inputs"));
    }

    #[test]
    fn test_run_rejects_invalid_pool_size() {
        let mut bad = args(vec![1]);
        bad.size = Some(0);
        let err = run(bad, true).unwrap_err();
        assert!(format!("{err:#}").contains("invalid pool size 0"));
    }

    #[test]
    fn test_modes_return_their_own_results() {
        let args = args(vec![3, 0, 5]);
        for mode in Mode::ALL {
            let results = modes::run(mode, &args).unwrap();
            assert_eq!(outputs(&results), vec![6, 0, 10]);
        }
    }

    #[test]
    fn test_baseline_mismatch_is_reported() {
        let doubler = args(vec![]).doubler();
        let ctx = WorkerContext::main_thread();
        let expected = vec![doubler.execute(&ctx, Task::from(1))];
        let actual = vec![doubler.execute(&ctx, Task::from(2))];
        assert!(check_against_baseline(Mode::Map, &actual, Some(expected.as_slice())).is_err());
        assert!(check_against_baseline(Mode::Map, &actual, Some(actual.as_slice())).is_ok());
        assert!(check_against_baseline(Mode::Map, &actual, None).is_ok());
    }
}
