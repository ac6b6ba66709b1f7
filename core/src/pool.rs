//! Fixed set of worker threads that run submitted queue operations.
//!
//! Pushes and pops travel on separate lanes, each drained by its own workers,
//! so operations blocked waiting for space can never occupy the threads a pop
//! needs to free that space (and the other way around).

use crate::error::QueueError;
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    Push,
    Pop,
}

impl Lane {
    fn name(self) -> &'static str {
        match self {
            Lane::Push => "push",
            Lane::Pop => "pop",
        }
    }
}

struct Senders {
    push: Sender<Job>,
    pop: Sender<Job>,
}

pub(crate) struct WorkerPool {
    /// `None` once shutdown has started. Submitters hold the read side while
    /// sending, so nothing slips in after the senders are taken.
    senders: RwLock<Option<Senders>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub(crate) fn start(workers_per_lane: usize) -> Result<Self, QueueError> {
        let (push_tx, push_rx) = crossbeam_channel::unbounded::<Job>();
        let (pop_tx, pop_rx) = crossbeam_channel::unbounded::<Job>();

        let mut handles = Vec::with_capacity(workers_per_lane * 2);
        for (lane, rx) in [(Lane::Push, push_rx), (Lane::Pop, pop_rx)] {
            for index in 0..workers_per_lane {
                match spawn_worker(lane, index, rx.clone()) {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        drop(push_tx);
                        drop(pop_tx);
                        join_all(handles);
                        return Err(QueueError::Spawn(e));
                    }
                }
            }
        }

        tracing::debug!(workers_per_lane, "Worker pool started");

        Ok(Self {
            senders: RwLock::new(Some(Senders {
                push: push_tx,
                pop: pop_tx,
            })),
            handles: Mutex::new(handles),
        })
    }

    pub(crate) fn submit(&self, lane: Lane, job: Job) -> Result<(), QueueError> {
        let senders = self.senders.read().unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = senders.as_ref() else {
            return Err(QueueError::Closed);
        };
        let tx = match lane {
            Lane::Push => &senders.push,
            Lane::Pop => &senders.pop,
        };
        tx.send(job).map_err(|_| QueueError::Closed)
    }

    /// Stops accepting jobs, lets the workers finish everything already
    /// queued, and joins them. Concurrent callers all return only after the
    /// workers are gone.
    pub(crate) fn shutdown(&self) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        let senders = self
            .senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(senders);
        join_all(std::mem::take(&mut *handles));
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    lane: Lane,
    index: usize,
    jobs: Receiver<Job>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("tarry-{}-{}", lane.name(), index))
        .spawn(move || {
            // Ends once every sender is gone and the channel is drained.
            for job in jobs.iter() {
                job();
            }
            tracing::trace!(lane = lane.name(), index, "Worker stopped");
        })
}

fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!("Queue worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_jobs_run_on_both_lanes() {
        let pool = WorkerPool::start(2).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        for lane in [Lane::Push, Lane::Pop, Lane::Push] {
            let ran = ran.clone();
            pool.submit(
                lane,
                Box::new(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shutdown_drains_queued_jobs() {
        let pool = WorkerPool::start(1).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let ran = ran.clone();
            pool.submit(
                Lane::Pop,
                Box::new(move || {
                    thread::sleep(Duration::from_millis(10));
                    ran.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::start(1).unwrap();
        pool.shutdown();
        let result = pool.submit(Lane::Push, Box::new(|| {}));
        assert!(matches!(result, Err(QueueError::Closed)));
        pool.shutdown();
    }

    #[test]
    fn test_worker_threads_are_named() {
        let pool = WorkerPool::start(1).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        pool.submit(
            Lane::Pop,
            Box::new(move || {
                let _ = tx.send(thread::current().name().map(str::to_string));
            }),
        )
        .unwrap();
        assert_eq!(rx.recv().unwrap().as_deref(), Some("tarry-pop-0"));
    }
}
