//! Order-preserving assembly of bulk results.
//!
//! Workers finish tasks in whatever order they happen to run, so
//! [`ResultCollector`] pre-allocates one slot per input and every outcome is
//! written into the slot of the task that produced it. The collected sequence
//! is therefore in input order no matter the completion order.

use crate::{Result, error::Error};

pub(crate) struct ResultCollector<R> {
    slots: Vec<Option<Result<R>>>,
    filled: usize,
}

impl<R> ResultCollector<R> {
    pub(crate) fn new(len: usize) -> Self {
        ResultCollector {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            filled: 0,
        }
    }

    /// Returns `true` once every slot holds an outcome.
    pub(crate) fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Stores the outcome of the task that was at `index` in the input.
    ///
    /// Each slot can be filled once.
    pub(crate) fn place(&mut self, index: usize, outcome: Result<R>) -> Result<()> {
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            Error::invalid_operation(format!("place result at out-of-range index {index}"))
        })?;
        if slot.is_some() {
            return Err(Error::invalid_operation(format!(
                "place result twice at index {index}"
            )));
        }
        *slot = Some(outcome);
        self.filled += 1;
        Ok(())
    }

    /// Returns the results in input order.
    ///
    /// A single failed task voids the whole batch: the failure with the lowest
    /// input index is returned and every successful result is discarded.
    pub(crate) fn finish(self) -> Result<Vec<R>> {
        if !self.is_complete() {
            return Err(Error::invalid_operation(format!(
                "finish with {} of {} results",
                self.filled,
                self.slots.len()
            )));
        }
        self.slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_placement_keeps_input_order() {
        let mut collector = ResultCollector::new(4);
        for index in [2, 0, 3, 1] {
            collector.place(index, Ok(index * 10)).unwrap();
        }
        assert!(collector.is_complete());
        assert_eq!(collector.finish().unwrap(), vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_empty_collector() {
        let collector = ResultCollector::<u64>::new(0);
        assert!(collector.is_complete());
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_first_failure_by_index_voids_batch() {
        let mut collector = ResultCollector::<u64>::new(3);
        collector
            .place(2, Err(Error::worker_failure("w3", "late")))
            .unwrap();
        collector.place(0, Ok(0)).unwrap();
        collector
            .place(1, Err(Error::worker_failure("w2", "early")))
            .unwrap();
        let err = collector.finish().unwrap_err();
        assert_eq!(err.to_string(), "worker 'w2' failed: early");
    }

    #[test]
    fn test_slot_misuse() {
        let mut collector = ResultCollector::new(2);
        collector.place(0, Ok(1u64)).unwrap();
        assert!(collector.place(0, Ok(2)).is_err());
        assert!(collector.place(5, Ok(3)).is_err());
        assert!(!collector.is_complete());
        assert!(collector.finish().is_err());
    }
}
