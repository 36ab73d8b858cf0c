//! The blocking, multi-producer, multi-consumer FIFO queue that feeds the
//! pool's workers.
//!
//! Every worker blocks in [`JobQueue::pop`] and the next idle worker takes the
//! next job, which keeps all workers busy while jobs remain. Closing the queue
//! is explicit: after [`JobQueue::close`] no job can be pushed, jobs already
//! queued are still handed out, and once the queue runs dry every waiting
//! consumer wakes up and sees `None`.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

pub(crate) struct JobQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for JobQueue<T> {
    /// Clones the handle to the queue, not the queue itself.
    fn clone(&self) -> Self {
        JobQueue {
            inner: self.inner.clone(),
        }
    }
}

impl<T> JobQueue<T> {
    pub(crate) fn new() -> Self {
        JobQueue {
            inner: Arc::new(Inner {
                state: Mutex::new(InnerState {
                    queue: VecDeque::new(),
                    closed: false,
                }),
                not_empty: Condvar::new(),
            }),
        }
    }

    /// Enqueues a job and wakes one waiting consumer.
    ///
    /// Returns `Err(item)` if the queue has been closed, giving the job back.
    pub(crate) fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.inner.state.lock().unwrap();
        if state.closed {
            return Err(item);
        }
        state.queue.push_back(item);
        drop(state);

        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Dequeues the oldest job, blocking while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub(crate) fn pop(&self) -> Option<T> {
        let state = self.inner.state.lock().unwrap();
        let mut state = self
            .inner
            .not_empty
            .wait_while(state, |state| state.queue.is_empty() && !state.closed)
            .unwrap();
        state.queue.pop_front()
    }

    /// Closes the queue for new jobs. Queued jobs remain available to `pop`.
    ///
    /// Returns `true` if this call performed the transition.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        if state.closed {
            return false;
        }
        state.closed = true;
        drop(state);

        self.inner.not_empty.notify_all();
        true
    }

    /// Number of jobs queued but not yet taken by a consumer.
    pub(crate) fn len(&self) -> usize {
        self.inner.state.lock().unwrap().queue.len()
    }
}

struct InnerState<T> {
    queue: VecDeque<T>,
    closed: bool,
}

struct Inner<T> {
    state: Mutex<InnerState<T>>,
    not_empty: Condvar,
}
