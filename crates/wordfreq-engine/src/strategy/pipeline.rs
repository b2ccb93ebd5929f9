use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::EngineError;
use crate::job::{Job, Partial, combine};

type Outcome = Result<Partial, EngineError>;

/// Every partition is a pool task that hands its store to a bounded merge
/// queue; the calling thread merges pairs until one result is left.
pub(super) fn run(job: &Job<'_>) -> Result<Partial, EngineError> {
    let partitions = job.partitions();
    if partitions.is_empty() {
        return Ok(Partial::default());
    }
    let queue = MergeQueue::new(job.worker_count.max(2), partitions.len());
    let queue = &queue;
    let pool = job.pool()?;
    pool.in_place_scope(|scope| {
        for range in partitions {
            scope.spawn(move |_| queue.complete(job.count_partition(range)));
        }
        merge_until_done(queue)
    })
}

fn merge_until_done(queue: &MergeQueue<Outcome>) -> Outcome {
    let mut merges = 0usize;
    loop {
        match queue.take_pair() {
            Taken::Pair(left, right) => {
                queue.push_back(combine(left, right));
                merges += 1;
            }
            Taken::Last(outcome) => {
                debug!(merges, "merge queue drained");
                return outcome.unwrap_or_else(|| Ok(Partial::default()));
            }
        }
    }
}

pub(crate) enum Taken<T> {
    Pair(T, T),
    /// Every producer finished and at most one item remains.
    Last(Option<T>),
}

struct QueueState<T> {
    items: VecDeque<T>,
    pending: usize,
}

/// Bounded blocking queue feeding a single merger.
///
/// Producers block while the queue is full. `pending` counts producers that
/// have not delivered yet and only changes under the same lock as the push.
pub(crate) struct MergeQueue<T> {
    state: Mutex<QueueState<T>>,
    filled: Condvar,
    drained: Condvar,
    capacity: usize,
}

impl<T> MergeQueue<T> {
    pub fn new(capacity: usize, producers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                pending: producers,
            }),
            filled: Condvar::new(),
            drained: Condvar::new(),
            capacity: capacity.max(2),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver one producer's result.
    pub fn complete(&self, item: T) {
        let mut state = self.lock();
        while state.items.len() >= self.capacity {
            state = self
                .drained
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.items.push_back(item);
        state.pending = state.pending.saturating_sub(1);
        self.filled.notify_one();
    }

    /// Block until two items can be merged or nothing more will arrive.
    pub fn take_pair(&self) -> Taken<T> {
        let mut state = self.lock();
        loop {
            if state.items.len() >= 2
                && let (Some(left), Some(right)) = (state.items.pop_front(), state.items.pop_front())
            {
                self.drained.notify_all();
                return Taken::Pair(left, right);
            }
            // Counter first, then emptiness.
            if state.pending == 0 {
                return Taken::Last(state.items.pop_front());
            }
            state = self
                .filled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Return a merged item. Ignores the capacity bound: the merger has just
    /// taken two.
    pub fn push_back(&self, item: T) {
        let mut state = self.lock();
        state.items.push_back(item);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn merges_everything_into_one_item() {
        let queue = MergeQueue::new(2, 6);
        let total = thread::scope(|scope| {
            for n in 1..=6u64 {
                let queue = &queue;
                scope.spawn(move || queue.complete(n));
            }
            loop {
                match queue.take_pair() {
                    Taken::Pair(a, b) => queue.push_back(a + b),
                    Taken::Last(last) => break last,
                }
            }
        });
        assert_eq!(total, Some(21));
    }

    #[test]
    fn no_producers_means_no_items() {
        let queue: MergeQueue<u8> = MergeQueue::new(4, 0);
        assert!(matches!(queue.take_pair(), Taken::Last(None)));
    }

    #[test]
    fn single_item_is_final() {
        let queue = MergeQueue::new(2, 1);
        queue.complete("only");
        assert!(matches!(queue.take_pair(), Taken::Last(Some("only"))));
    }
}
