//! Fixed-size worker pool with three dispatch modes.
//!
//! All three modes sit on one primitive: [`Pool::dispatch`] queues a job and
//! returns a [`PendingHandle`] resolved by whichever worker runs it.
//!
//! - [`Pool::map_all`]: submit every input, then wait for all of them and
//!   return the results in input order
//! - [`Pool::call_one`]: submit one input and wait for it
//! - [`Pool::submit`]: submit one input and return the handle

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, ThreadId},
};

use log::{debug, error, info, warn};

use crate::{
    Result,
    collector::ResultCollector,
    config::PoolConfig,
    error::Error,
    job_queue::JobQueue,
    oneshot,
    pending::PendingHandle,
    worker::{Job, Worker, WorkerContext, panic_message},
};

/// Lifecycle of a [`Pool`]: `Open` → `Closing` (after [`Pool::close`]) →
/// `Closed` (after [`Pool::join`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Open,
    Closing,
    Closed,
}

impl std::fmt::Display for PoolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PoolState::Open => "open",
            PoolState::Closing => "closing",
            PoolState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// A fixed set of worker threads fed from one shared FIFO queue.
///
/// Idle workers take the next queued job, so no worker starves while jobs
/// remain and up to `size` jobs run at the same time.
///
/// A task that panics does not take its worker down: the panic is caught and
/// delivered as `WorkerFailure` to whoever waits on that task, and the pool
/// keeps serving other tasks.
///
/// ## Thread Safety
///
/// All methods take `&self`, so a pool can be shared across threads (e.g. in
/// an `Arc`). Dropping the pool closes and joins it.
pub struct Pool {
    queue: JobQueue<Job>,
    workers: Mutex<Vec<Worker>>,
    worker_names: Vec<String>,
    worker_threads: Vec<ThreadId>,
    state: Mutex<PoolState>,
    next_task_id: AtomicU64,
}

impl Pool {
    /// Opens a pool of `size` workers without an initializer.
    pub fn open(size: usize) -> Result<Pool> {
        Self::with_config(PoolConfig::new(size))
    }

    /// Opens a pool sized to the number of logical processors.
    pub fn with_default_size() -> Result<Pool> {
        Self::with_config(PoolConfig::with_default_size())
    }

    /// Opens a pool as described by `config`.
    ///
    /// Returns once every worker has run the initializer. Fails with
    /// `InvalidPoolSize` if the size is 0, and with `WorkerFailure` if a
    /// worker thread cannot be spawned or its initializer panics; in both
    /// cases the workers started so far are shut down first.
    pub fn with_config(config: PoolConfig) -> Result<Pool> {
        let size = config.size();
        if size == 0 {
            return Err(Error::invalid_pool_size(size));
        }

        let queue = JobQueue::<Job>::new();
        let mut workers = Vec::with_capacity(size);
        let mut startups = Vec::with_capacity(size);
        for index in 0..size {
            let (started_tx, started_rx) = oneshot::channel();
            let spawned = Worker::spawn(
                index,
                config.worker_name(index),
                queue.clone(),
                config.initializer(),
                started_tx,
            );
            match spawned {
                Ok(worker) => {
                    workers.push(worker);
                    startups.push(started_rx);
                }
                Err(e) => {
                    Self::abort_startup(&queue, workers);
                    return Err(e);
                }
            }
        }

        let mut startup_failure = None;
        for (started, worker) in startups.iter().zip(&workers) {
            let outcome = started.recv().unwrap_or_else(|_| {
                Err(Error::worker_failure(
                    worker.name(),
                    "exited before reporting startup",
                ))
            });
            if let Err(e) = outcome {
                startup_failure.get_or_insert(e);
            }
        }
        if let Some(e) = startup_failure {
            Self::abort_startup(&queue, workers);
            return Err(e);
        }

        let worker_names = workers.iter().map(|w| w.name().to_string()).collect();
        let worker_threads = workers.iter().map(Worker::thread_id).collect();
        info!("opened pool with {size} workers");
        Ok(Pool {
            queue,
            workers: Mutex::new(workers),
            worker_names,
            worker_threads,
            state: Mutex::new(PoolState::Open),
            next_task_id: AtomicU64::new(0),
        })
    }

    fn abort_startup(queue: &JobQueue<Job>, workers: Vec<Worker>) {
        queue.close();
        for worker in workers {
            let name = worker.name().to_string();
            if let Err(e) = worker.join() {
                warn!("worker {name} failed while aborting startup: {e}");
            }
        }
    }

    /// Number of workers. Fixed for the lifetime of the pool.
    pub fn size(&self) -> usize {
        self.worker_names.len()
    }

    pub fn worker_names(&self) -> &[String] {
        &self.worker_names
    }

    pub fn state(&self) -> PoolState {
        *self.state.lock().unwrap()
    }

    /// Applies `f` to every input and returns the results in input order.
    ///
    /// Blocks until every task has finished. If any task fails, the whole
    /// batch fails with the error of the failed task that came first in the
    /// input; the other results are discarded.
    pub fn map_all<T, R, F, I>(&self, f: F, inputs: I) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&WorkerContext, T) -> R + Send + Sync + 'static,
        T: Send + 'static,
        R: Send + 'static,
    {
        let f = Arc::new(f);
        let handles = inputs
            .into_iter()
            .map(|input| {
                let f = f.clone();
                self.dispatch(move |ctx| f(ctx, input))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut collector = ResultCollector::new(handles.len());
        for (index, handle) in handles.iter().enumerate() {
            collector.place(index, handle.wait())?;
        }
        collector.finish()
    }

    /// Runs `f` on `input` on a worker and blocks until it returns.
    pub fn call_one<T, R, F>(&self, f: F, input: T) -> Result<R>
    where
        F: FnOnce(&WorkerContext, T) -> R + Send + 'static,
        T: Send + 'static,
        R: Send + 'static,
    {
        self.submit(f, input)?.wait()
    }

    /// Queues `f` on `input` without blocking.
    ///
    /// The only error reported here is `PoolClosed`; failures of the task
    /// itself surface when the returned handle is waited on.
    pub fn submit<T, R, F>(&self, f: F, input: T) -> Result<PendingHandle<R>>
    where
        F: FnOnce(&WorkerContext, T) -> R + Send + 'static,
        T: Send + 'static,
        R: Send + 'static,
    {
        self.dispatch(move |ctx| f(ctx, input))
    }

    /// Queues a job and returns the handle its worker will resolve.
    fn dispatch<R, F>(&self, f: F) -> Result<PendingHandle<R>>
    where
        F: FnOnce(&WorkerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel::<Result<R>>();
        let job: Job = Box::new(move |ctx: &WorkerContext| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(ctx))).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                error!("task #{id} panicked on {}: {message}", ctx.name());
                Error::worker_failure(ctx.name(), message)
            });
            // The caller may have dropped the handle.
            let _ = tx.send(outcome);
        });
        self.queue.push(job).map_err(|_| Error::pool_closed())?;
        Ok(PendingHandle::new(id, rx))
    }

    /// Stops accepting tasks. Tasks already submitted still run.
    ///
    /// Every dispatch after this fails with `PoolClosed`. Calling `close`
    /// again has no effect.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == PoolState::Open {
            self.queue.close();
            *state = PoolState::Closing;
            info!("pool closing, {} tasks still queued", self.queue.len());
        }
    }

    /// Waits for every submitted task to finish and every worker to exit.
    ///
    /// The pool must be closed first; joining an open pool fails with
    /// `InvalidOperation`, and so does joining from a task running on one of
    /// the pool's own workers. Joining a pool that is already closed returns
    /// immediately.
    pub fn join(&self) -> Result<()> {
        match self.state() {
            PoolState::Open => return Err(Error::invalid_operation("join on an open pool")),
            PoolState::Closed => return Ok(()),
            PoolState::Closing => {}
        }
        if self.is_own_worker(thread::current().id()) {
            return Err(Error::invalid_operation("join from a worker of the same pool"));
        }
        self.join_workers(None)
    }

    fn is_own_worker(&self, thread_id: ThreadId) -> bool {
        self.worker_threads.contains(&thread_id)
    }

    /// Joins every worker except `detached`, then marks the pool closed.
    ///
    /// Only the `workers` lock is held while joining, so tasks can still call
    /// `state` or `close`. A concurrent second join waits on that lock and
    /// finds nothing left to join.
    fn join_workers(&self, detached: Option<ThreadId>) -> Result<()> {
        let mut workers = self.workers.lock().unwrap();
        let mut failure = None;
        for worker in workers.drain(..) {
            if Some(worker.thread_id()) == detached {
                debug!(
                    "{} is tearing down its own pool, leaving it detached",
                    worker.name()
                );
                continue;
            }
            if let Err(e) = worker.join() {
                error!("{e}");
                failure.get_or_insert(e);
            }
        }
        *self.state.lock().unwrap() = PoolState::Closed;
        info!("pool closed");

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.close();
        // the last reference may be released by a task running on a worker
        let current = thread::current().id();
        let detached = self.is_own_worker(current).then_some(current);
        if let Err(e) = self.join_workers(detached) {
            warn!("pool teardown: {e}");
        }
    }
}
