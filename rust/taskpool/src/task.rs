//! The doubling task function and its input/output types.
//!
//! [`Doubler::execute`] doubles its input after a simulated delay of half the
//! input, measured in [`TimeUnit`]s, and reports which worker ran it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;

use crate::{Result, verify_arg, worker::WorkerContext};

/// One unit of input for the task function. Inputs are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Task {
    input: u64,
}

impl Task {
    /// Builds a task from a signed input, rejecting negative values.
    pub fn new(input: i64) -> Result<Task> {
        verify_arg!(input, input >= 0);
        Ok(Task {
            input: input as u64,
        })
    }

    pub fn input(&self) -> u64 {
        self.input
    }
}

impl From<u64> for Task {
    fn from(input: u64) -> Self {
        Task { input }
    }
}

/// Validates a whole input sequence, failing on the first negative value.
pub fn tasks_from(inputs: &[i64]) -> Result<Vec<Task>> {
    inputs.iter().map(|&input| Task::new(input)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskResult {
    output: u64,
}

impl TaskResult {
    pub fn output(&self) -> u64 {
        self.output
    }
}

/// Wall-clock length of one unit of simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnit(Duration);

impl TimeUnit {
    pub const SECOND: TimeUnit = TimeUnit(Duration::from_secs(1));

    pub fn from_millis(millis: u64) -> Self {
        TimeUnit(Duration::from_millis(millis))
    }

    /// Simulated delay of a task: half its input, in units.
    ///
    /// Returns `None` if the delay does not fit in a `Duration`.
    pub fn checked_delay_for(&self, input: u64) -> Option<Duration> {
        Duration::try_from_secs_f64(self.0.as_secs_f64() * (input as f64 / 2.0)).ok()
    }

    /// Like [`checked_delay_for`](Self::checked_delay_for).
    ///
    /// # Panics
    ///
    /// Panics if the delay does not fit in a `Duration`.
    pub fn delay_for(&self, input: u64) -> Duration {
        self.checked_delay_for(input)
            .unwrap_or_else(|| panic!("delay for task input {input} is out of range"))
    }

    /// Sum of the simulated delays of `tasks`, i.e. the least time a
    /// sequential run can take.
    pub fn total_delay(&self, tasks: &[Task]) -> Duration {
        tasks.iter().map(|task| self.delay_for(task.input())).sum()
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        Self::SECOND
    }
}

/// The pure doubling computation.
///
/// # Panics
///
/// Panics if the doubled value does not fit in a `u64`.
pub fn double(input: u64) -> u64 {
    input
        .checked_mul(2)
        .unwrap_or_else(|| panic!("task input {input} is too large to double"))
}

/// The task function: doubles a task's input after sleeping for its
/// simulated delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct Doubler {
    unit: TimeUnit,
}

impl Doubler {
    pub fn new(unit: TimeUnit) -> Self {
        Doubler { unit }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Fails with `InvalidArgument` if `task` cannot be executed: its delay
    /// does not fit in a `Duration` or its doubled input overflows.
    pub fn verify(&self, task: Task) -> Result<()> {
        let input = task.input();
        verify_arg!(input, self.unit.checked_delay_for(input).is_some());
        verify_arg!(input, input.checked_mul(2).is_some());
        Ok(())
    }

    /// # Panics
    ///
    /// Panics on a task that [`verify`](Self::verify) rejects.
    pub fn execute(&self, ctx: &WorkerContext, task: Task) -> TaskResult {
        let delay = self.unit.delay_for(task.input());
        println!(
            "Sleeping for {:.3} seconds at Process name {}, ID {}",
            delay.as_secs_f64(),
            ctx.name(),
            ctx.pid()
        );
        debug!(
            "{} sleeping {delay:?} for input {}",
            ctx.name(),
            task.input()
        );
        std::thread::sleep(delay);
        TaskResult {
            output: double(task.input()),
        }
    }

    /// Runs every task on the calling thread, one after the other.
    ///
    /// Every task is verified before the first one runs.
    pub fn map_sequential(&self, tasks: &[Task]) -> Result<Vec<TaskResult>> {
        for &task in tasks {
            self.verify(task)?;
        }
        let ctx = WorkerContext::main_thread();
        Ok(tasks.iter().map(|&task| self.execute(&ctx, task)).collect())
    }
}

/// Worker initializer that prints a startup line with the wall-clock time
/// (seconds modulo 100), the worker name and the process id.
pub fn announce_startup(ctx: &WorkerContext) {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() % 100.0)
        .unwrap_or_default();
    println!(
        "Initiating at time {timestamp:.4} s, at Process name {}, ID {}",
        ctx.name(),
        ctx.pid()
    );
}

/// Outputs of `results`, for display.
pub fn outputs(results: &[TaskResult]) -> Vec<u64> {
    results.iter().map(TaskResult::output).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Instant;

    #[test]
    fn test_double() {
        for x in [0u64, 1, 2, 7, 1000, u64::MAX / 2] {
            assert_eq!(double(x), 2 * x);
        }
    }

    #[test]
    #[should_panic(expected = "too large to double")]
    fn test_double_overflow() {
        double(u64::MAX);
    }

    #[test]
    fn test_negative_input_is_rejected() {
        let err = Task::new(-1).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(Task::new(5).unwrap().input(), 5);
        assert!(tasks_from(&[0, 1, -2, 3]).is_err());
        assert_eq!(tasks_from(&[0, 1]).unwrap(), vec![Task::from(0), Task::from(1)]);
    }

    #[test]
    fn test_delay_is_half_the_input() {
        let unit = TimeUnit::from_millis(10);
        assert_eq!(unit.delay_for(0), Duration::ZERO);
        assert_eq!(unit.delay_for(1), Duration::from_millis(5));
        assert_eq!(unit.delay_for(4), Duration::from_millis(20));
        assert_eq!(TimeUnit::default().delay_for(3), Duration::from_millis(1500));

        let tasks = tasks_from(&[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(TimeUnit::SECOND.total_delay(&tasks), Duration::from_secs(5));
    }

    #[test]
    fn test_execute_doubles_and_sleeps() {
        let doubler = Doubler::new(TimeUnit::from_millis(20));
        let ctx = WorkerContext::main_thread();
        let start = Instant::now();
        let result = doubler.execute(&ctx, Task::from(3));
        assert_eq!(result.output(), 6);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_map_sequential() {
        let doubler = Doubler::new(TimeUnit::from_millis(1));
        let tasks = tasks_from(&[0, 1, 2, 3, 4]).unwrap();
        let results = doubler.map_sequential(&tasks).unwrap();
        assert_eq!(outputs(&results), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_out_of_range_delay_is_rejected() {
        let unit = TimeUnit::from_millis(100_000);
        assert!(unit.checked_delay_for(u64::MAX / 4).is_none());
        assert_eq!(unit.checked_delay_for(2), Some(Duration::from_secs(100)));

        let doubler = Doubler::new(unit);
        let huge = Task::from(u64::MAX / 4);
        let err = doubler.verify(huge).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert!(doubler.map_sequential(&[Task::from(1), huge]).is_err());
    }

    #[test]
    fn test_overflowing_input_is_rejected() {
        let doubler = Doubler::new(TimeUnit::from_millis(0));
        assert!(doubler.verify(Task::from(u64::MAX / 2)).is_ok());
        assert!(doubler.verify(Task::from(u64::MAX)).is_err());
    }
}
