// Copyright (c) Microsoft Corporation.

//! `query_with_cancellation`: races a driver operation against a cancel source.

use crate::cancel_source::{CancelReason, CancelSource};
use crate::error::Error;
use crate::operation::{EmulatedDriver, QueryOperation, Rows};

/// Runs `query` through `driver`, returning whichever of the three outcomes in §4.7
/// resolves first: the operation's success, the operation's failure, or `cancel_source`
/// firing.
///
/// On cancellation, the operation is signaled via [`QueryOperation::cancel`] and its
/// resolution is awaited before this function returns, so no background work from the
/// operation outlives the call (see §5's cancellation semantics and §8's "Cancellation
/// joins" invariant).
///
/// # Errors
///
/// Returns the driver's own error if `prepare_query` fails to start the operation, the
/// operation's error if it resolves with a failure, or [`crate::ErrorKind::Canceled`] /
/// [`crate::ErrorKind::DeadlineExceeded`] if `cancel_source` fires first.
pub async fn query_with_cancellation<D: EmulatedDriver>(
    driver: &D,
    cancel_source: &CancelSource,
    query: &str,
    args: &[String],
) -> Result<Rows, Error> {
    let mut operation = driver.prepare_query(cancel_source, query, args)?;

    tokio::select! {
        result = operation.await_result() => result,
        reason = cancel_source.canceled() => {
            operation.cancel().await?;
            // Drain the operation's own resolution so no background work outlives this call.
            drop(operation.await_result().await);
            Err(match reason {
                CancelReason::Canceled => Error::canceled(),
                CancelReason::DeadlineExceeded => Error::deadline_exceeded(),
            })
        }
    }
}
