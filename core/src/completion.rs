//! One-shot handle through which a worker reports how a submitted operation ended.

use crate::error::QueueError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

pub(crate) fn channel<O>() -> (Resolver<O>, Completion<O>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, Completion { rx })
}

/// Worker side of a [`Completion`].
pub(crate) struct Resolver<O> {
    tx: oneshot::Sender<O>,
}

impl<O> Resolver<O> {
    pub(crate) fn resolve(self, outcome: O) {
        // The caller is free to have discarded its handle.
        let _ = self.tx.send(outcome);
    }
}

/// Caller side of a submitted push or pop.
///
/// Dropping it is fine: the operation still runs to its outcome. Await it from
/// async code, or call [`Completion::wait`] from a plain thread.
#[derive(Debug)]
pub struct Completion<O> {
    rx: oneshot::Receiver<O>,
}

impl<O> Completion<O> {
    /// Blocks the current thread until the operation commits or drops.
    ///
    /// Panics when called from inside an async runtime; `.await` the
    /// completion there instead.
    pub fn wait(self) -> Result<O, QueueError> {
        self.rx.blocking_recv().map_err(|_| QueueError::Abandoned)
    }

    /// Checks for an outcome without blocking. `Ok(None)` means the operation
    /// is still pending. Once an outcome has been taken, later calls report
    /// [`QueueError::Abandoned`].
    pub fn try_outcome(&mut self) -> Result<Option<O>, QueueError> {
        match self.rx.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(QueueError::Abandoned),
        }
    }
}

impl<O> Future for Completion<O> {
    type Output = Result<O, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| QueueError::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_receives_outcome() {
        let (resolver, completion) = channel();
        resolver.resolve(42);
        assert_eq!(completion.wait().unwrap(), 42);
    }

    #[test]
    fn test_try_outcome_pending_then_ready() {
        let (resolver, mut completion) = channel();
        assert!(completion.try_outcome().unwrap().is_none());
        resolver.resolve("done");
        assert_eq!(completion.try_outcome().unwrap(), Some("done"));
    }

    #[test]
    fn test_dropped_resolver_is_abandoned() {
        let (resolver, completion) = channel::<u8>();
        drop(resolver);
        assert!(matches!(completion.wait(), Err(QueueError::Abandoned)));
    }

    #[test]
    fn test_resolve_without_receiver() {
        let (resolver, completion) = channel();
        drop(completion);
        resolver.resolve(1u32);
    }

    #[tokio::test]
    async fn test_await_from_another_thread() {
        let (resolver, completion) = channel();
        std::thread::spawn(move || resolver.resolve(String::from("ok")));
        assert_eq!(completion.await.unwrap(), "ok");
    }
}
