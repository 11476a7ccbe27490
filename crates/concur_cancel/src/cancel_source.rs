// Copyright (c) Microsoft Corporation.

//! A cancellation source with a single terminal state, optionally armed with a deadline.
//!
//! See §4.7 / §5's cancellation semantics: `Active -> Canceled{reason}` is the only
//! transition, observed identically by every waiter, and a timeout is modeled as a
//! deadline-armed source rather than a distinct mechanism.

use std::sync::Arc;
use std::time::Duration;

use anyspawn::Spawner;
use parking_lot::Mutex;
use tick::{Clock, Delay};
use tokio::sync::Notify;

/// Why a [`CancelSource`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// [`CancelSource::cancel`] was called explicitly.
    Canceled,
    /// The source's configured deadline elapsed first.
    DeadlineExceeded,
}

/// A single-terminal-state cancellation signal, shared across clones.
///
/// Every clone observes the same transition; `cancel()` after the source has already
/// fired (by deadline or a previous `cancel()`) is a safe no-op.
#[derive(Debug, Clone)]
pub struct CancelSource {
    inner: Arc<Mutex<Option<CancelReason>>>,
    notify: Arc<Notify>,
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSource {
    /// Creates a source with no deadline; it only fires via explicit [`Self::cancel`].
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(None)), notify: Arc::new(Notify::new()) }
    }

    /// Creates a source that fires [`CancelReason::DeadlineExceeded`] after `duration`,
    /// unless [`Self::cancel`] fires it first.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime context (see [`anyspawn::Spawner::new_tokio`]).
    #[must_use]
    pub fn with_deadline(duration: Duration, clock: &Clock) -> Self {
        let source = Self::new();
        let armed = source.clone();
        let delay = Delay::new(clock, duration);
        Spawner::new_tokio().spawn(async move {
            delay.await;
            armed.fire(CancelReason::DeadlineExceeded);
        });
        source
    }

    /// Fires [`CancelReason::Canceled`]. A no-op if the source has already fired.
    pub fn cancel(&self) {
        self.fire(CancelReason::Canceled);
    }

    fn fire(&self, reason: CancelReason) {
        let mut guard = self.inner.lock();
        if guard.is_none() {
            *guard = Some(reason);
            drop(guard);
            self.notify.notify_waiters();
        }
    }

    /// Returns the reason this source fired, if it has.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        *self.inner.lock()
    }

    /// Awaits the terminal reason. Returns immediately if the source has already fired.
    pub async fn canceled(&self) -> CancelReason {
        loop {
            let notified = self.notify.notified();
            if let Some(reason) = *self.inner.lock() {
                return reason;
            }
            notified.await;
        }
    }
}
