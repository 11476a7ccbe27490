// Copyright (c) Microsoft Corporation.

//! Error types for the bounded task queue and its wire protocol.

/// An error produced by [`crate::BoundedTaskQueue`] or the demo wire protocol.
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

/// The category of failure, matching the fixed error vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The queue was at capacity when `put` was called.
    QueueFull,
    /// The queue has been shut down and no longer accepts new tasks.
    QueueClosed,
    /// A task executor panicked instead of returning an outcome.
    WorkerPanic,
    /// A task executor returned an ordinary failure (I/O error, timeout) that was not a panic.
    TaskFailed,
    /// The request frame named an unrecognized task `type`.
    InvalidTaskKind,
    /// A non-positive capacity or pool size was supplied at construction.
    ConfigInvalid,
    /// The wire frame could not be decoded as JSON.
    DecodeError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::QueueFull => "queue is full",
            Self::QueueClosed => "queue is closed",
            Self::WorkerPanic => "worker panicked",
            Self::TaskFailed => "task failed",
            Self::InvalidTaskKind => "invalid task kind",
            Self::ConfigInvalid => "queue capacity and pool size must be greater than zero",
            Self::DecodeError => "malformed request frame",
        };
        f.write_str(text)
    }
}

impl Error {
    /// Builds a `QueueFull` error.
    #[must_use]
    pub fn queue_full() -> Self {
        Self::new(ErrorKind::QueueFull)
    }

    /// Builds a `QueueClosed` error.
    #[must_use]
    pub fn queue_closed() -> Self {
        Self::new(ErrorKind::QueueClosed)
    }

    /// Builds a `WorkerPanic` error from the panic payload, when it can be stringified.
    #[must_use]
    pub fn worker_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::caused_by(ErrorKind::WorkerPanic, message)
    }

    /// Builds a `TaskFailed` error wrapping an ordinary executor failure (I/O, timeout).
    pub fn task_failed(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::TaskFailed, cause)
    }

    /// Builds an `InvalidTaskKind` error naming the unrecognized `type` field.
    #[must_use]
    pub fn invalid_task_kind(kind: impl std::fmt::Display) -> Self {
        Self::caused_by(ErrorKind::InvalidTaskKind, format!("unknown task type {kind:?}", kind = kind.to_string()))
    }

    /// Builds a `ConfigInvalid` error for a non-positive capacity or pool size.
    #[must_use]
    pub fn config_invalid(detail: impl std::fmt::Display) -> Self {
        Self::caused_by(ErrorKind::ConfigInvalid, detail.to_string())
    }

    /// Builds a `DecodeError` wrapping the underlying JSON parse failure.
    pub fn decode_error(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::DecodeError, cause)
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A specialized [`Result`] type for queue operations.
pub type Result<T> = std::result::Result<T, Error>;
