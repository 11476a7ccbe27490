// Copyright (c) Microsoft Corporation.

//! A one-shot result cell awaited by many, produced by one.

use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::Error;

/// Terminal state of a [`SharedFuture`]. Published once, as a single immutable snapshot,
/// so waiters can never observe a torn read between "value set" and "metadata set".
#[derive(Debug, Clone)]
enum State<T> {
    Pending,
    Ready(T),
    Failed(Error),
}

/// A one-shot result cell that can be awaited by any number of waiters, but produced by
/// exactly one producer.
///
/// Unlike `tokio::sync::oneshot`, a `SharedFuture` can be cloned and awaited repeatedly;
/// every clone observes the same terminal value. This is the shape [`crate::SingleFlight`]
/// needs: the winning caller produces a value once, and every follower (including ones
/// that join after completion) awaits the identical outcome.
#[derive(Debug, Clone)]
pub struct SharedFuture<T> {
    inner: Arc<parking_lot::Mutex<State<T>>>,
    notify: Arc<Notify>,
}

impl<T: Clone> SharedFuture<T> {
    /// Creates a new, pending future.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(parking_lot::Mutex::new(State::Pending)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Publishes a successful result. Silently ignored if the future has already reached
    /// a terminal state.
    pub fn complete(&self, value: T) {
        self.publish(State::Ready(value));
    }

    /// Publishes a failure. Silently ignored if the future has already reached a terminal
    /// state.
    pub fn fail(&self, error: Error) {
        self.publish(State::Failed(error));
    }

    fn publish(&self, state: State<T>) {
        let mut guard = self.inner.lock();
        if matches!(*guard, State::Pending) {
            *guard = state;
            drop(guard);
            self.notify.notify_waiters();
        }
    }

    /// Awaits the terminal state. Returns immediately if it is already set; otherwise
    /// suspends until `complete` or `fail` is called on any clone of this future.
    pub async fn await_result(&self) -> Result<T, Error> {
        loop {
            // Register for notification before checking state, so a concurrent publish
            // between the check and the wait cannot be missed.
            let notified = self.notify.notified();
            match &*self.inner.lock() {
                State::Pending => {}
                State::Ready(value) => return Ok(value.clone()),
                State::Failed(error) => return Err(error.clone()),
            }
            notified.await;
        }
    }

    /// Returns `true` if this future has reached a terminal state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(*self.inner.lock(), State::Pending)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completes_once_and_stays_complete() {
        let future = SharedFuture::pending();
        future.complete(42);
        future.complete(7); // ignored, already terminal
        assert_eq!(future.await_result().await.unwrap(), 42);
        assert_eq!(future.await_result().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn late_waiter_sees_existing_result() {
        let future = SharedFuture::pending();
        future.complete("done");
        assert_eq!(future.await_result().await.unwrap(), "done");
    }

    #[tokio::test]
    async fn many_waiters_observe_same_terminal_value() {
        let future = SharedFuture::<u32>::pending();
        let waiters: Vec<_> = (0..16)
            .map(|_| {
                let future = future.clone();
                tokio::spawn(async move { future.await_result().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(5)).await;
        future.complete(99);

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap().unwrap(), 99);
        }
    }

    #[tokio::test]
    async fn failure_is_observed_by_all_waiters() {
        let future = SharedFuture::<u32>::pending();
        future.fail(Error::loader_failed("boom"));
        assert!(future.await_result().await.is_err());
    }
}
