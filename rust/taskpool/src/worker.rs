//! Worker threads and the identity they hand to the code they run.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, ThreadId},
};

use log::{debug, error};

use crate::{Result, error::Error, job_queue::JobQueue, oneshot::OneshotSender};

/// A unit of work queued on the pool. The worker passes its own context in.
pub(crate) type Job = Box<dyn FnOnce(&WorkerContext) + Send + 'static>;

/// One-time startup hook run by every worker before it takes any job.
pub type Initializer = Arc<dyn Fn(&WorkerContext) + Send + Sync + 'static>;

/// Identity of the execution context running a task.
///
/// Every worker builds one of these when it starts and passes it by reference
/// to the initializer and to every task it executes, so task code never needs
/// to look up "the current worker" through global state.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    index: usize,
    name: String,
    pid: u32,
    thread_id: ThreadId,
}

impl WorkerContext {
    fn current(index: usize, name: String) -> WorkerContext {
        WorkerContext {
            index,
            name,
            pid: std::process::id(),
            thread_id: thread::current().id(),
        }
    }

    /// Context describing the calling thread when it runs work itself, outside
    /// any pool.
    pub fn main_thread() -> WorkerContext {
        Self::current(0, "MainProcess".to_string())
    }

    /// 0-based position of the worker in its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

pub(crate) struct Worker {
    name: String,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    /// Spawns a worker thread.
    ///
    /// The thread runs `initializer` (if any) and reports the outcome through
    /// `started` before it takes its first job. A worker whose initializer
    /// panics reports `WorkerFailure` and exits without touching the queue.
    pub(crate) fn spawn(
        index: usize,
        name: String,
        queue: JobQueue<Job>,
        initializer: Option<Initializer>,
        started: OneshotSender<Result<()>>,
    ) -> Result<Worker> {
        let thread_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::thread_fn(index, thread_name, queue, initializer, started))
            .map_err(|e| Error::worker_failure(&name, format!("failed to spawn thread: {e}")))?;
        Ok(Worker { name, handle })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Waits for the worker thread to exit.
    pub(crate) fn join(self) -> Result<()> {
        self.handle.join().map_err(|payload| {
            Error::worker_failure(&self.name, panic_message(payload.as_ref()))
        })
    }

    fn thread_fn(
        index: usize,
        name: String,
        queue: JobQueue<Job>,
        initializer: Option<Initializer>,
        started: OneshotSender<Result<()>>,
    ) {
        let context = WorkerContext::current(index, name);
        debug!("worker {} started (pid {})", context.name(), context.pid());

        if let Some(initializer) = initializer {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| initializer(&context)))
            {
                let message = panic_message(payload.as_ref());
                error!("initializer panicked on {}: {message}", context.name());
                let _ = started.send(Err(Error::worker_failure(context.name(), message)));
                return;
            }
        }
        let _ = started.send(Ok(()));

        while let Some(job) = queue.pop() {
            job(&context);
        }

        debug!("worker {} exiting", context.name());
    }
}

/// Extracts the message of a panic payload, if it carries one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
