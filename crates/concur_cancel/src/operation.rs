// Copyright (c) Microsoft Corporation.

//! The `EmulatedDriver`/`QueryOperation` traits, and a mock driver exercising the three
//! canonical scenarios (timeout, explicit cancel, success) from §8.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyspawn::Spawner;
use concur_primitives::SharedFuture;
use tokio::sync::oneshot;

use crate::cancel_source::CancelSource;
use crate::error::Error;

/// A row set returned by a successful query. Opaque beyond its rows for this toolkit's
/// purposes; the demo driver only ever produces an echo of its configured payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rows {
    /// The rows themselves, as opaque JSON-ish text for the demo driver.
    pub rows: Vec<String>,
}

/// A handle to a started query, returned by [`EmulatedDriver::prepare_query`].
///
/// `await_result` may be called more than once (e.g. once from the happy path and once,
/// after `cancel`, to confirm the operation has drained); every call after the first
/// observes the same terminal outcome.
pub trait QueryOperation: Send {
    /// Awaits the operation's terminal outcome.
    fn await_result(&mut self) -> impl Future<Output = Result<Rows, Error>> + Send;

    /// Requests that the operation stop. Safe to call at any point, including after the
    /// operation has already resolved, in which case it is a no-op.
    fn cancel(&mut self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// A driver that can start an asynchronous query execution.
///
/// See §4.7. Implementations model a real database driver: `prepare_query` starts work
/// in the background and returns immediately with a handle to observe or cancel it.
pub trait EmulatedDriver: Send + Sync {
    /// The operation handle this driver produces.
    type Operation: QueryOperation;

    /// Starts `query` with `args`, returning a handle to observe or cancel it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be started at all (e.g. malformed SQL);
    /// this is distinct from the operation later resolving with a failure.
    fn prepare_query(&self, cancel_source: &CancelSource, query: &str, args: &[String]) -> Result<Self::Operation, Error>;
}

/// What a [`MockOperation`] should do once its simulated work "completes".
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Resolve successfully with an echo of the query as a single row, after `delay`.
    Succeed {
        /// How long the simulated work takes before resolving.
        delay: Duration,
    },
    /// Resolve with a [`crate::ErrorKind::DriverFailed`] error, after `delay`.
    Fail {
        /// How long the simulated work takes before resolving.
        delay: Duration,
        /// The message attached to the resulting error.
        message: String,
    },
}

/// A driver that simulates query execution with a configurable delay and outcome,
/// exercising the cancel/timeout/success race without a real database.
#[derive(Debug, Clone)]
pub struct MockDriver {
    behavior: MockBehavior,
}

impl MockDriver {
    /// Creates a driver whose operations behave as `behavior` describes.
    #[must_use]
    pub const fn new(behavior: MockBehavior) -> Self {
        Self { behavior }
    }
}

impl EmulatedDriver for MockDriver {
    type Operation = MockOperation;

    fn prepare_query(&self, _cancel_source: &CancelSource, query: &str, _args: &[String]) -> Result<Self::Operation, Error> {
        Ok(MockOperation::spawn(query.to_string(), self.behavior.clone()))
    }
}

/// The operation handle produced by [`MockDriver`].
#[derive(Debug)]
pub struct MockOperation {
    result: SharedFuture<Result<Rows, Error>>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl MockOperation {
    fn spawn(query: String, behavior: MockBehavior) -> Self {
        let result = SharedFuture::pending();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let result_for_task = result.clone();
        Spawner::new_tokio().spawn(async move {
            let (delay, outcome) = match behavior {
                MockBehavior::Succeed { delay } => (delay, Ok(Rows { rows: vec![query] })),
                MockBehavior::Fail { delay, message } => (delay, Err(Error::driver_failed(message))),
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    result_for_task.complete(outcome);
                }
                _ = cancel_rx => {
                    tracing::debug!(query, "operation observed cancellation");
                    result_for_task.complete(Err(Error::canceled()));
                }
            }
        });

        Self { result, cancel_tx: Some(cancel_tx) }
    }
}

impl QueryOperation for MockOperation {
    async fn await_result(&mut self) -> Result<Rows, Error> {
        match self.result.await_result().await {
            Ok(outcome) => outcome,
            // `SharedFuture::fail` is never called by `MockOperation`; this arm exists
            // only because `await_result`'s signature is generic over it.
            Err(_) => Err(Error::driver_failed("result cell failed unexpectedly")),
        }
    }

    async fn cancel(&mut self) -> Result<(), Error> {
        if let Some(sender) = self.cancel_tx.take() {
            drop(sender.send(()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel_source::CancelSource;

    #[tokio::test]
    async fn succeeding_operation_returns_rows() {
        let driver = MockDriver::new(MockBehavior::Succeed { delay: Duration::from_millis(5) });
        let cancel_source = CancelSource::new();
        let mut operation = driver.prepare_query(&cancel_source, "fast_query", &[]).unwrap();
        let rows = operation.await_result().await.unwrap();
        assert_eq!(rows.rows, vec!["fast_query".to_string()]);
    }

    #[tokio::test]
    async fn cancel_short_circuits_the_simulated_delay() {
        let driver = MockDriver::new(MockBehavior::Succeed { delay: Duration::from_secs(10) });
        let cancel_source = CancelSource::new();
        let mut operation = driver.prepare_query(&cancel_source, "slow_query", &[]).unwrap();

        operation.cancel().await.unwrap();
        let result = operation.await_result().await;
        assert_eq!(result.unwrap_err().kind(), crate::error::ErrorKind::Canceled);
    }

    #[tokio::test]
    async fn cancel_after_resolution_is_a_no_op() {
        let driver = MockDriver::new(MockBehavior::Succeed { delay: Duration::from_millis(5) });
        let cancel_source = CancelSource::new();
        let mut operation = driver.prepare_query(&cancel_source, "fast_query", &[]).unwrap();
        let first = operation.await_result().await.unwrap();

        operation.cancel().await.unwrap();
        let second = operation.await_result().await.unwrap();
        assert_eq!(first, second);
    }
}
