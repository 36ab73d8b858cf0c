//! Handles for results of tasks dispatched without blocking.
//!
//! A [`PendingHandle`] is returned by [`Pool::submit`](crate::pool::Pool::submit)
//! and is resolved by exactly one worker. The caller collects the outcome with
//! [`PendingHandle::wait`].
//!
//! ## Lifecycle
//!
//! 1. **Pending**: the task is queued or running
//! 2. **Ready**: the worker has written the outcome
//! 3. **Consumed**: the outcome has been taken by `wait`; any further `wait`
//!    fails with [`ErrorKind::HandleConsumed`](crate::error::ErrorKind::HandleConsumed)

use std::time::Duration;

use crate::{
    Result,
    error::Error,
    oneshot::{OneshotReceiver, RecvError},
};

/// A future-like token for the outcome of one dispatched task.
pub struct PendingHandle<R> {
    id: u64,
    rx: OneshotReceiver<Result<R>>,
}

impl<R> PendingHandle<R> {
    pub(crate) fn new(id: u64, rx: OneshotReceiver<Result<R>>) -> PendingHandle<R> {
        PendingHandle { id, rx }
    }

    /// Checks without blocking whether the outcome has been written.
    ///
    /// Also returns `true` once the outcome has been consumed.
    pub fn is_ready(&self) -> bool {
        !self.rx.is_pending()
    }

    /// Blocks until the task completes and returns its outcome.
    ///
    /// The outcome is handed out once. A second call returns
    /// `HandleConsumed`. If the task panicked, the error is `WorkerFailure`.
    pub fn wait(&self) -> Result<R> {
        Self::resolve(self.id, self.rx.recv())
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// Returns `None` if the task is still running; the handle can be waited
    /// on again later.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<R>> {
        self.rx
            .recv_timeout(timeout)
            .map(|res| Self::resolve(self.id, res))
    }

    fn resolve(id: u64, res: std::result::Result<Result<R>, RecvError>) -> Result<R> {
        match res {
            Ok(outcome) => outcome,
            Err(RecvError::Consumed) => Err(Error::handle_consumed()),
            Err(RecvError::Disconnected) => Err(Error::worker_failure(
                "unknown",
                format!("task #{id} was dropped before producing a result"),
            )),
        }
    }
}

impl<R> std::fmt::Debug for PendingHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingHandle")
            .field("id", &self.id)
            .field("ready", &self.is_ready())
            .finish()
    }
}
