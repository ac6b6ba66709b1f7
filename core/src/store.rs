//! Capacity-bounded FIFO storage shared between the pool workers.
//!
//! Every read and write of the deque happens under `inner`. The two condition
//! variables re-check their predicate on each wake, so spurious or stale
//! notifications are harmless.

use crate::types::{PopOutcome, PushOutcome, QueueStats};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub(crate) struct Store<T> {
    inner: Mutex<VecDeque<T>>,
    capacity: usize,
    /// Mirror of `inner.len()`, written in the same critical section as the deque.
    len: AtomicUsize,
    space_available: Condvar,
    item_available: Condvar,
    counters: Counters,
}

#[derive(Default)]
struct Counters {
    pushes_committed: AtomicU64,
    pushes_dropped: AtomicU64,
    pops_committed: AtomicU64,
    pops_dropped: AtomicU64,
}

impl<T> Store<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            len: AtomicUsize::new(0),
            space_available: Condvar::new(),
            item_available: Condvar::new(),
            counters: Counters::default(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lock-free length probe. May lag behind operations still waiting.
    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats {
            pushes_committed: self.counters.pushes_committed.load(Ordering::Relaxed),
            pushes_dropped: self.counters.pushes_dropped.load(Ordering::Relaxed),
            pops_committed: self.counters.pops_committed.load(Ordering::Relaxed),
            pops_dropped: self.counters.pops_dropped.load(Ordering::Relaxed),
        }
    }

    // A panicking worker cannot leave the deque half-mutated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits on `cond` until `ready` holds or `deadline` passes. Returns the
    /// guard and whether the predicate held.
    fn wait_until<'a>(
        &self,
        cond: &Condvar,
        guard: MutexGuard<'a, VecDeque<T>>,
        deadline: Instant,
        ready: impl Fn(&VecDeque<T>) -> bool,
    ) -> (MutexGuard<'a, VecDeque<T>>, bool) {
        let timeout = deadline.saturating_duration_since(Instant::now());
        let (guard, _) = cond
            .wait_timeout_while(guard, timeout, |queue| !ready(queue))
            .unwrap_or_else(PoisonError::into_inner);
        let satisfied = ready(&guard);
        (guard, satisfied)
    }

    /// Appends `element` once there is room, or gives it back at `deadline`.
    pub(crate) fn enqueue(&self, element: T, deadline: Instant) -> PushOutcome<T> {
        let guard = self.lock();
        let (mut queue, has_space) =
            self.wait_until(&self.space_available, guard, deadline, |q| {
                q.len() < self.capacity
            });

        if !has_space {
            drop(queue);
            self.counters.pushes_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(capacity = self.capacity, "Timeout occurred, ignoring push");
            return PushOutcome::Dropped(element);
        }

        queue.push_back(element);
        self.len.store(queue.len(), Ordering::Release);
        self.counters.pushes_committed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(len = queue.len(), capacity = self.capacity, "Push committed");
        self.item_available.notify_one();
        PushOutcome::Committed
    }

    /// Removes the head once there is one, or gives up at `deadline`.
    pub(crate) fn dequeue(&self, deadline: Instant) -> PopOutcome<T> {
        let guard = self.lock();
        let (mut queue, _) =
            self.wait_until(&self.item_available, guard, deadline, |q| !q.is_empty());

        let Some(value) = queue.pop_front() else {
            drop(queue);
            self.counters.pops_dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(capacity = self.capacity, "Timeout occurred, ignoring pop");
            return PopOutcome::Dropped;
        };

        self.len.store(queue.len(), Ordering::Release);
        self.counters.pops_committed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(len = queue.len(), capacity = self.capacity, "Pop committed");
        self.space_available.notify_one();
        PopOutcome::Committed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn soon(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[test]
    fn test_enqueue_dequeue_fifo() {
        let store = Store::new(3);
        for i in 1..=3 {
            assert!(store.enqueue(i, soon(10)).is_committed());
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.dequeue(soon(10)), PopOutcome::Committed(1));
        assert_eq!(store.dequeue(soon(10)), PopOutcome::Committed(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_enqueue_full_drops_and_returns_element() {
        let store = Store::new(1);
        assert!(store.enqueue("a", soon(10)).is_committed());
        let started = Instant::now();
        assert_eq!(store.enqueue("b", soon(50)), PushOutcome::Dropped("b"));
        assert!(started.elapsed() >= Duration::from_millis(45));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().pushes_dropped, 1);
    }

    #[test]
    fn test_dequeue_empty_drops() {
        let store = Store::<u8>::new(2);
        assert_eq!(store.dequeue(soon(20)), PopOutcome::Dropped);
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().pops_dropped, 1);
    }

    #[test]
    fn test_past_deadline_still_commits_when_ready() {
        let store = Store::new(1);
        let past = Instant::now();
        thread::sleep(Duration::from_millis(5));
        assert!(store.enqueue(9, past).is_committed());
        assert_eq!(store.dequeue(past), PopOutcome::Committed(9));
    }

    #[test]
    fn test_waiting_dequeue_woken_by_enqueue() {
        let store = Arc::new(Store::new(1));
        let waiter = {
            let store = store.clone();
            thread::spawn(move || store.dequeue(soon(2000)))
        };
        thread::sleep(Duration::from_millis(50));
        assert!(store.enqueue(5, soon(10)).is_committed());
        assert_eq!(waiter.join().unwrap(), PopOutcome::Committed(5));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_waiting_enqueue_woken_by_dequeue() {
        let store = Arc::new(Store::new(1));
        assert!(store.enqueue(1, soon(10)).is_committed());
        let waiter = {
            let store = store.clone();
            thread::spawn(move || store.enqueue(2, soon(2000)))
        };
        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.dequeue(soon(10)), PopOutcome::Committed(1));
        assert!(waiter.join().unwrap().is_committed());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.stats(),
            QueueStats {
                pushes_committed: 2,
                pushes_dropped: 0,
                pops_committed: 1,
                pops_dropped: 0,
            }
        );
    }

    #[test]
    fn test_capacity_never_exceeded_under_contention() {
        let store = Arc::new(Store::new(4));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let outcome = store.enqueue(i, soon(30));
                    assert!(store.len() <= store.capacity());
                    outcome
                })
            })
            .collect();
        let committed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(PushOutcome::is_committed)
            .count();
        assert_eq!(committed, 4);
        assert_eq!(store.len(), 4);
    }
}
