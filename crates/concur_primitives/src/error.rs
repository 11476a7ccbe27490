// Copyright (c) Microsoft Corporation.

//! Error types shared by the cache and single-flight primitives.

/// An error produced by [`crate::SingleFlight`] or [`crate::Cache`].
///
/// Matches the fixed error vocabulary: loader failures (including loader panics) and
/// invalid cache configuration are the only failure modes this crate produces itself;
/// everything else is the caller's loader error, carried through as the `source`.
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

/// The category of failure, matching the fixed error vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The loader failed; the underlying cause is attached as the error's `source`.
    LoaderFailed,
    /// The loader panicked instead of returning a value or an error.
    LoaderPanicked,
    /// A non-positive capacity was supplied at construction.
    ConfigInvalid,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::LoaderFailed => "loader failed",
            Self::LoaderPanicked => "loader panicked",
            Self::ConfigInvalid => "cache capacity must be greater than zero",
        };
        f.write_str(text)
    }
}

impl Error {
    /// Builds a `LoaderFailed` error wrapping the loader's own error.
    pub fn loader_failed(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::LoaderFailed, cause)
    }

    /// Builds a `LoaderPanicked` error from the panic payload, when it can be stringified.
    #[must_use]
    pub fn loader_panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::caused_by(ErrorKind::LoaderPanicked, message)
    }

    /// Builds a `ConfigInvalid` error for a non-positive capacity.
    #[must_use]
    pub fn config_invalid(capacity: impl std::fmt::Display) -> Self {
        Self::caused_by(ErrorKind::ConfigInvalid, format!("capacity must be > 0, got {capacity}"))
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A specialized [`Result`] type for cache and single-flight operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_failed_carries_kind() {
        let err = Error::loader_failed("boom");
        assert_eq!(err.kind(), ErrorKind::LoaderFailed);
    }

    #[test]
    fn config_invalid_mentions_capacity() {
        let err = Error::config_invalid(0);
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(format!("{err:?}").contains('0'));
    }
}
