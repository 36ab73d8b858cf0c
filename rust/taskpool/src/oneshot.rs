//! A single-write, single-read handoff between a worker and the caller that
//! dispatched a task.
//!
//! The sender writes at most one value. The receiver takes it at most once:
//! every later receive reports [`RecvError::Consumed`]. If the sender is dropped
//! without writing, the receiver observes [`RecvError::Disconnected`] instead of
//! blocking forever.
//!
//! ## Channel Lifecycle
//!
//! 1. Pending: waiting for the value
//! 2. Ready: the value was written and is waiting to be taken
//! 3. Taken: the value was handed to a receiver
//! 4. Closed: the sender went away without writing
//!
//! The cell is guarded by a `Mutex` and a `Condvar`, so the reader can only
//! observe the value after the writer's store is complete.

use std::{
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

/// Creates a new oneshot channel, returning a sender and receiver pair.
pub fn channel<T>() -> (OneshotSender<T>, OneshotReceiver<T>) {
    let cell = Arc::new(OneshotCell::new());
    (OneshotSender(cell.clone()), OneshotReceiver(cell))
}

/// Why a receive produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The value was already taken by an earlier receive.
    Consumed,
    /// The sender was dropped without sending a value.
    Disconnected,
}

/// The sending half of a oneshot channel.
///
/// Dropping the sender without calling [`send`](Self::send) closes the channel.
pub struct OneshotSender<T>(Arc<OneshotCell<T>>);

impl<T> OneshotSender<T> {
    /// Writes the value, consuming the sender.
    ///
    /// Returns `Err(value)` if the receiver side already gave up on the channel.
    pub fn send(self, value: T) -> Result<(), T> {
        self.0.set(value)
    }
}

impl<T> Drop for OneshotSender<T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// The receiving half of a oneshot channel.
pub struct OneshotReceiver<T>(Arc<OneshotCell<T>>);

impl<T> OneshotReceiver<T> {
    /// Blocks until the value is available and takes it.
    pub fn recv(&self) -> Result<T, RecvError> {
        self.0.wait()
    }

    /// Like [`recv`](Self::recv), but gives up after `timeout`.
    ///
    /// Returns `None` if the value is still pending when the timeout expires;
    /// the channel is left untouched in that case.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<T, RecvError>> {
        self.0.wait_for(timeout)
    }

    /// Returns `true` while no value has been written and the sender is alive.
    pub fn is_pending(&self) -> bool {
        self.0.is_pending()
    }
}

struct OneshotCell<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

impl<T> OneshotCell<T> {
    fn new() -> OneshotCell<T> {
        OneshotCell {
            state: Mutex::new(State::Pending),
            condvar: Condvar::new(),
        }
    }

    fn set(&self, value: T) -> Result<(), T> {
        let res = self.state.lock().unwrap().set(value);
        self.condvar.notify_all();
        res
    }

    fn close(&self) {
        self.state.lock().unwrap().close();
        self.condvar.notify_all();
    }

    fn is_pending(&self) -> bool {
        self.state.lock().unwrap().is_pending()
    }

    fn wait(&self) -> Result<T, RecvError> {
        let guard = self.state.lock().unwrap();
        self.condvar
            .wait_while(guard, |state| state.is_pending())
            .unwrap()
            .take()
    }

    fn wait_for(&self, timeout: Duration) -> Option<Result<T, RecvError>> {
        let guard = self.state.lock().unwrap();
        let (mut guard, res) = self
            .condvar
            .wait_timeout_while(guard, timeout, |state| state.is_pending())
            .unwrap();
        if res.timed_out() && guard.is_pending() {
            None
        } else {
            Some(guard.take())
        }
    }
}

/// State transitions:
/// - `Pending` -> `Ready(T)` when the value is sent
/// - `Pending` -> `Closed` when the sender is dropped unsent
/// - `Ready(T)` -> `Taken` when the value is received
enum State<T> {
    Pending,
    Ready(T),
    Taken,
    Closed,
}

impl<T> State<T> {
    fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    fn set(&mut self, value: T) -> Result<(), T> {
        match self {
            State::Pending => {
                *self = State::Ready(value);
                Ok(())
            }
            State::Ready(_) | State::Taken | State::Closed => Err(value),
        }
    }

    fn close(&mut self) {
        if self.is_pending() {
            *self = State::Closed;
        }
    }

    /// # Panics
    ///
    /// Panics if called when the state is still pending.
    fn take(&mut self) -> Result<T, RecvError> {
        match self {
            State::Pending => panic!("State::take() unexpected: value is not ready yet"),
            State::Taken => Err(RecvError::Consumed),
            State::Closed => Err(RecvError::Disconnected),
            State::Ready(_) => match std::mem::replace(self, State::Taken) {
                State::Ready(value) => Ok(value),
                _ => unreachable!("state checked above"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::UnsafeCell, time::Duration};

    use super::{OneshotReceiver, OneshotSender, RecvError, channel};

    #[test]
    fn test_oneshot_send_sync() {
        fn is_send_sync<T: Send + Sync>() {}

        fn test<T: Send>() {
            is_send_sync::<OneshotReceiver<T>>();
            is_send_sync::<OneshotSender<T>>();
        }

        test::<usize>();
        test::<UnsafeCell<usize>>();
    }

    #[test]
    fn test_oneshot_value_taken_once() {
        let (tx, rx) = channel::<usize>();
        assert!(rx.is_pending());
        tx.send(1).unwrap();
        assert!(!rx.is_pending());
        assert_eq!(rx.recv(), Ok(1));
        assert_eq!(rx.recv(), Err(RecvError::Consumed));
    }

    #[test]
    fn test_oneshot_cross_thread() {
        let (tx, rx) = channel::<usize>();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            tx.send(7).unwrap();
        });
        assert_eq!(rx.recv(), Ok(7));
    }

    #[test]
    fn test_oneshot_timeout_leaves_channel_usable() {
        let (tx, rx) = channel::<usize>();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            tx.send(1).unwrap();
        });
        assert!(rx.recv_timeout(Duration::from_millis(10)).is_none());
        assert!(rx.is_pending());
        assert_eq!(rx.recv(), Ok(1));
        writer.join().unwrap();
    }

    #[test]
    fn test_oneshot_sender_dropped() {
        let (tx, rx) = channel::<usize>();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(tx);
        });
        assert_eq!(rx.recv(), Err(RecvError::Disconnected));
        assert!(!rx.is_pending());
    }
}
