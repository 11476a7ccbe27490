// Copyright (c) Microsoft Corporation.

//! Error types for cancellable queries.

/// An error produced by [`crate::query_with_cancellation`] or an [`crate::EmulatedDriver`].
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

/// The category of failure, matching the fixed error vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The cancel source was explicitly canceled before the operation resolved.
    Canceled,
    /// The cancel source's deadline elapsed before the operation resolved.
    DeadlineExceeded,
    /// The driver's operation resolved with a failure; the cause is attached.
    DriverFailed,
    /// A non-positive deadline was supplied at construction.
    ConfigInvalid,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Canceled => "canceled",
            Self::DeadlineExceeded => "deadline exceeded",
            Self::DriverFailed => "driver operation failed",
            Self::ConfigInvalid => "deadline must be greater than zero",
        };
        f.write_str(text)
    }
}

impl Error {
    /// Builds a `Canceled` error.
    #[must_use]
    pub fn canceled() -> Self {
        Self::new(ErrorKind::Canceled)
    }

    /// Builds a `DeadlineExceeded` error.
    #[must_use]
    pub fn deadline_exceeded() -> Self {
        Self::new(ErrorKind::DeadlineExceeded)
    }

    /// Builds a `DriverFailed` error wrapping the driver's own error.
    pub fn driver_failed(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::DriverFailed, cause)
    }

    /// Builds a `ConfigInvalid` error for a non-positive deadline.
    #[must_use]
    pub fn config_invalid(detail: impl std::fmt::Display) -> Self {
        Self::caused_by(ErrorKind::ConfigInvalid, detail.to_string())
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A specialized [`Result`] type for cancellable-query operations.
pub type Result<T> = std::result::Result<T, Error>;
