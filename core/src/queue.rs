use crate::completion::{self, Completion};
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::pool::{Job, Lane, WorkerPool};
use crate::store::Store;
use crate::types::{Lifecycle, PopOutcome, PushOutcome, QueueStats};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Fixed-capacity FIFO queue whose pushes and pops run asynchronously.
///
/// [`push`](Self::push) and [`pop`](Self::pop) return as soon as the operation
/// has been handed to a worker. The worker waits up to the wait bound for room
/// (push) or for an element (pop) and then either commits or drops the
/// operation. The returned [`Completion`] reports which; it can be discarded.
///
/// Dropping the queue (or calling [`close`](Self::close)) blocks until every
/// submitted operation has committed or dropped.
pub struct BoundedAsyncQueue<T> {
    store: Arc<Store<T>>,
    pool: WorkerPool,
    wait_bound: Duration,
    in_flight: Arc<AtomicUsize>,
    state: AtomicU8,
}

impl<T: Send + 'static> BoundedAsyncQueue<T> {
    /// Creates a queue holding at most `capacity` elements, with the default
    /// wait bound and worker count.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Self::with_config(QueueConfig::new(capacity))
    }

    pub fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;
        let pool = WorkerPool::start(config.workers)?;

        tracing::info!(
            capacity = config.capacity,
            wait_bound_ms = config.wait_bound_ms,
            workers = config.workers,
            "Queue started"
        );

        Ok(Self {
            store: Arc::new(Store::new(config.capacity)),
            pool,
            wait_bound: config.wait_bound(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            state: AtomicU8::new(Lifecycle::Active as u8),
        })
    }

    /// Submits `element` for appending at the tail.
    pub fn push(&self, element: T) -> Result<Completion<PushOutcome<T>>, QueueError> {
        self.push_within(element, self.wait_bound)
    }

    /// Like [`push`](Self::push), waiting at most `bound` instead of the
    /// configured wait bound.
    pub fn push_within(
        &self,
        element: T,
        bound: Duration,
    ) -> Result<Completion<PushOutcome<T>>, QueueError> {
        self.submit(Lane::Push, bound, move |store, deadline| {
            store.enqueue(element, deadline)
        })
    }

    /// Submits removal of the head element.
    pub fn pop(&self) -> Result<Completion<PopOutcome<T>>, QueueError> {
        self.pop_within(self.wait_bound)
    }

    pub fn pop_within(&self, bound: Duration) -> Result<Completion<PopOutcome<T>>, QueueError> {
        self.submit(Lane::Pop, bound, |store, deadline| store.dequeue(deadline))
    }

    fn submit<O, F>(&self, lane: Lane, bound: Duration, op: F) -> Result<Completion<O>, QueueError>
    where
        O: Send + 'static,
        F: FnOnce(&Store<T>, Instant) -> O + Send + 'static,
    {
        if self.state() != Lifecycle::Active {
            return Err(QueueError::Closed);
        }

        // The bound runs from submission, so time spent waiting for a free
        // worker counts against it.
        let deadline = Instant::now()
            .checked_add(bound)
            .ok_or_else(|| QueueError::InvalidConfig(format!("wait bound too large: {:?}", bound)))?;

        let (resolver, completion) = completion::channel();
        let store = self.store.clone();
        let in_flight = self.in_flight.clone();
        let job: Job = Box::new(move || {
            let outcome = op(&store, deadline);
            in_flight.fetch_sub(1, Ordering::AcqRel);
            resolver.resolve(outcome);
        });

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.pool.submit(lane, job) {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(e);
        }
        Ok(completion)
    }
}

impl<T> BoundedAsyncQueue<T> {
    /// Number of elements currently stored.
    ///
    /// Lock-free: it never reports a length the store did not have, but
    /// operations still waiting on a worker are not reflected until they
    /// commit.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn wait_bound(&self) -> Duration {
        self.wait_bound
    }

    pub fn state(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Operations submitted that have not yet committed or dropped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> QueueStats {
        self.store.stats()
    }

    /// Stops accepting submissions and blocks until every operation already
    /// submitted has committed or dropped. Calling it again is a no-op.
    pub fn close(&self) {
        let first = self
            .state
            .compare_exchange(
                Lifecycle::Active as u8,
                Lifecycle::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if first {
            tracing::info!(pending = self.in_flight(), "Closing queue");
        }

        self.pool.shutdown();
        self.state.store(Lifecycle::Closed as u8, Ordering::Release);

        if first {
            let stats = self.stats();
            tracing::info!(
                len = self.len(),
                committed = stats.committed(),
                dropped = stats.dropped(),
                "Queue closed"
            );
        }
    }
}

impl<T> Drop for BoundedAsyncQueue<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> std::fmt::Debug for BoundedAsyncQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedAsyncQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("in_flight", &self.in_flight())
            .field("state", &self.state())
            .finish()
    }
}
