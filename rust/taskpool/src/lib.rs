//! A fixed-size worker pool that runs a task function over a batch of inputs.
//!
//! The pool spawns its workers up front, optionally runs a one-time
//! initializer on each, and offers three ways to hand it work:
//!
//! - [`Pool::map_all`] - bulk map; blocks until every input is processed and
//!   returns the results in input order
//! - [`Pool::call_one`] - one task at a time; blocks until that task is done
//! - [`Pool::submit`] + [`PendingHandle::wait`] - fire now, collect later
//!
//! All three are expressed over a single submit-with-handle primitive. The
//! workers report their identity to task code through a [`WorkerContext`]
//! argument rather than through global state.
//!
//! # Key Components
//!
//! - [`pool`] - pool lifecycle (`open` → `close` → `join`) and dispatch
//! - [`worker`] - worker threads and [`WorkerContext`]
//! - [`pending`] - [`PendingHandle`], the result of a non-blocking dispatch
//! - `collector` - order-preserving assembly of bulk results
//! - [`task`] - the doubling task function used by the demo driver
//! - `job_queue` and [`oneshot`] - the queue feeding the workers and the
//!   single-value handoff behind every handle
//!
//! # Example
//!
//! ```rust,no_run
//! use taskpool::{Doubler, Pool, PoolConfig, Task, TimeUnit, announce_startup};
//!
//! let pool = Pool::with_config(PoolConfig::new(4).with_initializer(announce_startup))?;
//! let doubler = Doubler::new(TimeUnit::from_millis(100));
//! let tasks = taskpool::task::tasks_from(&[0, 1, 2, 3, 4])?;
//!
//! let results = pool.map_all(move |ctx, task: Task| doubler.execute(ctx, task), tasks)?;
//! assert_eq!(taskpool::task::outputs(&results), vec![0, 2, 4, 6, 8]);
//!
//! pool.close();
//! pool.join()?;
//! # Ok::<(), taskpool::Error>(())
//! ```

mod collector;
pub mod config;
pub mod error;
mod job_queue;
pub mod oneshot;
pub mod pending;
pub mod pool;
pub mod result;
pub mod task;
pub mod worker;

pub use config::{PoolConfig, default_pool_size};
pub use error::{Error, ErrorKind};
pub use pending::PendingHandle;
pub use pool::{Pool, PoolState};
pub use result::Result;
pub use task::{Doubler, Task, TaskResult, TimeUnit, announce_startup};
pub use worker::{Initializer, WorkerContext};
