// Copyright (c) Microsoft Corporation.

//! Deduplicates concurrent loads for the same key.
//!
//! Builds directly on [`uniflight::Merger`]'s leader/follower coalescing (a `DashMap` of
//! weak [`async_once_cell::OnceCell`] handles); this module adds the panic-safety the
//! fixed error vocabulary requires: a loader panic must fail the waiting callers with a
//! `LoaderFailed`-shaped error rather than unwinding through them.

use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt as _;
use uniflight::Merger;

use crate::error::Error;

/// Deduplicates concurrent loads for the same key: the first caller to ask for a missing
/// key runs the loader, every other concurrent caller for that key awaits the same result.
///
/// See §4.2: at most one loader invocation is in flight per key at any instant, and losing
/// callers receive the winner's result (or its error) without re-running the loader.
pub struct SingleFlight<K, V> {
    merger: Merger<K, Result<V, Error>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self { merger: Merger::new() }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates a new, empty single-flight group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `loader` for `key`, coalescing concurrent calls for the same key into a single
    /// invocation.
    ///
    /// If `loader`'s future panics, every waiting caller (the leader included) receives
    /// `Err(Error::loader_panicked(..))` instead of the panic unwinding through them.
    pub async fn do_work<F, Fut>(&self, key: K, loader: F) -> Result<V, Error>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, Error>> + Send,
    {
        self.merger
            .work(key, || AssertUnwindSafe(loader()).catch_unwind().map(|outcome| match outcome {
                Ok(result) => result,
                Err(panic_payload) => Err(Error::loader_panicked(&*panic_payload)),
            }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn single_caller_runs_loader() {
        let group: SingleFlight<&str, i32> = SingleFlight::new();
        let result = group.do_work("k", || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_loader_invocation() {
        let group = Arc::new(SingleFlight::<&str, u64>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let group = Arc::clone(&group);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                group
                    .do_work("K", || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Ok(7)
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loader_error_is_propagated_and_not_cached() {
        let group: SingleFlight<&str, i32> = SingleFlight::new();
        let first = group.do_work("k", || async { Err(Error::loader_failed("boom")) }).await;
        assert!(first.is_err());

        let second = group.do_work("k", || async { Ok(1) }).await;
        assert_eq!(second.unwrap(), 1);
    }

    #[tokio::test]
    async fn loader_panic_fails_every_waiter_instead_of_unwinding() {
        let group = Arc::new(SingleFlight::<&str, i32>::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let group = Arc::clone(&group);
            handles.push(tokio::spawn(async move {
                group
                    .do_work("k", || async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        panic!("loader exploded");
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_err());
        }
    }
}
