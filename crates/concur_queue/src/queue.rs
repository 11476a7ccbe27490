// Copyright (c) Microsoft Corporation.

//! A bounded FIFO task queue served by a fixed pool of workers.
//!
//! See §4.6. Admission (`put`) never blocks: a full queue or a shut-down queue both fail
//! immediately with a typed error, and the surrounding demo is the one that retries.
//! Dequeuing is handled by `tokio::sync::mpsc`'s own bounded channel, which gives FIFO
//! pickup and `Full`/`Closed` admission failures for free; the queue layers a `closed`
//! flag on top so `shutdown` can reject new work before the channel itself is torn down.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyspawn::{JoinHandle, Spawner};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};

use crate::error::Error;
use crate::task::{execute, Task, TaskOutcome};

struct Envelope {
    task: Task,
    completion: oneshot::Sender<TaskOutcome>,
}

/// An observer invoked with the queue's current depth after each successful `put`.
///
/// Models the original's process-wide "waiting goroutines" gauge as an injected hook
/// rather than a singleton (see §9's "Global mutable state in queue logging" note).
pub type WaitingObserver = Arc<dyn Fn(usize) + Send + Sync>;

/// A fixed worker pool draining a bounded FIFO queue, delivering each task's outcome on
/// a dedicated one-shot completion channel.
///
/// See §4.6.
pub struct BoundedTaskQueue {
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<Envelope>>>,
    handles: Mutex<Option<Vec<JoinHandle<()>>>>,
    on_waiting_change: Option<WaitingObserver>,
}

impl std::fmt::Debug for BoundedTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedTaskQueue")
            .field("capacity", &self.capacity)
            .field("closed", &self.sender.lock().is_none())
            .finish_non_exhaustive()
    }
}

impl BoundedTaskQueue {
    /// Starts `pool_size` workers draining a queue of depth `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::ConfigInvalid`] if `capacity` or `pool_size` is zero.
    pub fn new(capacity: usize, pool_size: usize, quiet: bool) -> Result<Self, Error> {
        BoundedTaskQueueBuilder::new(capacity, pool_size).quiet(quiet).build()
    }

    /// Starts a builder for finer-grained construction.
    #[must_use]
    pub const fn builder(capacity: usize, pool_size: usize) -> BoundedTaskQueueBuilder {
        BoundedTaskQueueBuilder::new(capacity, pool_size)
    }

    /// Submits `task`, returning the receiving end of its one-shot completion channel.
    ///
    /// Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::QueueFull`] if the queue is at capacity, or
    /// [`crate::ErrorKind::QueueClosed`] if [`Self::shutdown`] has been called.
    pub fn put(&self, task: Task) -> Result<oneshot::Receiver<TaskOutcome>, Error> {
        let sender = {
            let guard = self.sender.lock();
            guard.clone()
        };
        let Some(sender) = sender else {
            return Err(Error::queue_closed());
        };

        let (completion_tx, completion_rx) = oneshot::channel();
        match sender.try_send(Envelope { task, completion: completion_tx }) {
            Ok(()) => {
                if let Some(observer) = &self.on_waiting_change {
                    let depth = self.capacity.saturating_sub(sender.capacity());
                    observer(depth);
                }
                Ok(completion_rx)
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(Error::queue_full()),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::queue_closed()),
        }
    }

    /// Stops admitting new tasks and waits for every already-accepted task to finish.
    ///
    /// Idempotent: calling this more than once after the first has returned is a no-op.
    pub async fn shutdown(&self) {
        self.sender.lock().take();

        let handles = self.handles.lock().take();
        if let Some(handles) = handles {
            for handle in handles {
                handle.await;
            }
        }
    }

    /// The configured queue depth.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

async fn run_task(task: Task) -> TaskOutcome {
    let id = task.id.clone();
    match AssertUnwindSafe(execute(&task)).catch_unwind().await {
        Ok(Ok(bytes)) => TaskOutcome::success(id, bytes),
        Ok(Err(err)) => TaskOutcome::failure(id, err),
        Err(panic_payload) => TaskOutcome::failure(id, Error::worker_panic(&*panic_payload)),
    }
}

async fn worker_loop(receiver: Arc<AsyncMutex<mpsc::Receiver<Envelope>>>, quiet: bool) {
    loop {
        let envelope = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(Envelope { task, completion }) = envelope else {
            break;
        };

        if !quiet {
            tracing::debug!(task_id = %task.id, kind = task.kind.as_wire_str(), "executing task");
        }
        let outcome = run_task(task).await;
        // The receiving end may already be gone if the caller dropped it; that is not
        // this worker's problem.
        drop(completion.send(outcome));
    }
}

/// Builder for [`BoundedTaskQueue`], matching the workspace's pervasive builder convention.
#[derive(Debug)]
pub struct BoundedTaskQueueBuilder {
    capacity: usize,
    pool_size: usize,
    quiet: bool,
}

impl BoundedTaskQueueBuilder {
    /// Starts a builder with the given capacity and worker-pool size.
    #[must_use]
    pub const fn new(capacity: usize, pool_size: usize) -> Self {
        Self { capacity, pool_size, quiet: false }
    }

    /// Suppresses per-task debug logging.
    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Builds the queue and starts its worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::ConfigInvalid`] if `capacity` or `pool_size` is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime context (see [`anyspawn::Spawner::new_tokio`]).
    pub fn build(self) -> Result<BoundedTaskQueue, Error> {
        self.build_with_observer(None)
    }

    /// Builds the queue with an optional hook invoked with queue depth after each `put`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::ConfigInvalid`] if `capacity` or `pool_size` is zero.
    pub fn build_with_observer(self, on_waiting_change: Option<WaitingObserver>) -> Result<BoundedTaskQueue, Error> {
        if self.capacity == 0 || self.pool_size == 0 {
            return Err(Error::config_invalid(format!("capacity={}, pool_size={}", self.capacity, self.pool_size)));
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let spawner = Spawner::new_tokio();
        let handles =
            (0..self.pool_size).map(|_| spawner.spawn(worker_loop(Arc::clone(&receiver), self.quiet))).collect();

        Ok(BoundedTaskQueue {
            capacity: self.capacity,
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(Some(handles)),
            on_waiting_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::task::TaskKind;

    fn sum_task(id: &str, a: i64, b: i64) -> Task {
        Task { id: id.to_string(), kind: TaskKind::Sum, input: json!({"a": a, "b": b}) }
    }

    #[tokio::test]
    async fn put_then_shutdown_delivers_outcome() {
        let queue = BoundedTaskQueue::new(4, 2, true).unwrap();
        let completion = queue.put(sum_task("1", 2, 40)).unwrap();
        let outcome = completion.await.unwrap();
        assert_eq!(outcome.id, "1");
        let result: serde_json::Value = serde_json::from_slice(&outcome.result.unwrap()).unwrap();
        assert_eq!(result["res"], 42);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let queue = BoundedTaskQueue::new(4, 2, true).unwrap();
        queue.shutdown().await;
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn put_after_shutdown_fails_closed() {
        let queue = BoundedTaskQueue::new(4, 1, true).unwrap();
        queue.shutdown().await;
        let err = queue.put(sum_task("1", 1, 1)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::QueueClosed);
    }

    #[tokio::test]
    async fn queue_backpressure_then_retry_after_drain() {
        let queue = BoundedTaskQueue::new(4, 1, true).unwrap();

        // Fill the bounded channel with rapid-fire `put`s before the single worker gets a
        // chance to dequeue any of them (no `.await` happens in this loop, so the worker
        // task never runs until this function yields).
        let mut completions = Vec::new();
        for i in 0..4 {
            completions.push(queue.put(sum_task(&i.to_string(), i, 1)).unwrap());
        }

        let fifth = queue.put(sum_task("4", 1, 1));
        assert_eq!(fifth.unwrap_err().kind(), crate::error::ErrorKind::QueueFull);

        for completion in completions {
            completion.await.unwrap();
        }

        let retried = queue.put(sum_task("4", 1, 1)).unwrap();
        retried.await.unwrap();
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_payload_is_an_ordinary_failure_not_a_panic() {
        let queue = BoundedTaskQueue::new(4, 1, true).unwrap();
        let task = Task { id: "bad".to_string(), kind: TaskKind::Sum, input: json!("not an object") };
        let outcome = queue.put(task).unwrap().await.unwrap();
        assert_eq!(outcome.result, None);
        assert!(outcome.error.as_deref().unwrap_or_default().contains("malformed request frame"));

        // The worker survives: a subsequent well-formed task still completes.
        let next = queue.put(sum_task("ok", 1, 2)).unwrap().await.unwrap();
        assert!(next.error.is_none());
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn worker_panic_is_contained_and_reported() {
        let queue = BoundedTaskQueue::new(4, 1, true).unwrap();

        // `i64::MAX + 1` overflows, which panics in a debug/test build (overflow checks are
        // on). This exercises the real `catch_unwind` path in `run_task`, not a simulated one.
        let task = Task { id: "boom".to_string(), kind: TaskKind::Sum, input: json!({"a": i64::MAX, "b": 1}) };
        let outcome = queue.put(task).unwrap().await.unwrap();
        assert_eq!(outcome.result, None);
        assert_eq!(outcome.error.as_deref(), Some("worker panicked"));

        // The worker thread survives the panic: a subsequent well-formed task still
        // completes instead of the pool silently losing a worker.
        let next = queue.put(sum_task("ok", 1, 2)).unwrap().await.unwrap();
        assert!(next.error.is_none());
        queue.shutdown().await;
    }
}
