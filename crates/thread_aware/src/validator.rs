// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::{MemoryAffinity, PinnedAffinity, ThreadAware, ThreadRegistry};

/// A validator that checks if the current thread is running on its home memory affinity.
///
/// This can be used to ensure that a thread has not been moved to another memory affinity
/// without being correctly relocated.
#[derive(Debug, Clone)]
pub struct ThreadAwareValidator {
    home: MemoryAffinity,
    registry: Arc<ThreadRegistry>,
}

impl ThreadAwareValidator {
    /// Creates a new validator for the given home memory affinity and thread registry.
    pub fn with_affinity(home: impl Into<MemoryAffinity>, registry: Arc<ThreadRegistry>) -> Self {
        Self {
            home: home.into(),
            registry,
        }
    }

    /// Checks if the current thread is running on its home memory affinity.
    ///
    /// If the validator has been send to another thread without being correctly relocated,
    /// this will return false.
    ///
    /// If the current thread has not been pinned, this will also return false.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let current_affinity = self.registry.current_affinity();

        current_affinity == self.home
    }
}

impl ThreadAware for ThreadAwareValidator {
    fn relocated(mut self, _source: MemoryAffinity, destination: PinnedAffinity) -> Self {
        self.home = destination.into();
        self
    }
}
