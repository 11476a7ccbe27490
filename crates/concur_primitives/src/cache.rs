// Copyright (c) Microsoft Corporation.

//! Composes a store with a single-flight loader into `get`/`set` with miss-loading.
//!
//! Grounded in `cachelon`'s `LoadingCache` (single-flight-wrapped `get_or_insert` over a
//! `CacheTier`), adapted per §9's "Cache facade composition" note: this facade is the
//! only component that touches both the single-flight group and the store, in a fixed
//! order (single-flight first, then `store.insert` on success) so a lost-update race
//! between a concurrent `Set` and a winning loader's publish cannot occur.

use std::future::Future;
use std::hash::Hash;

use cachelon_tier::{CacheEntry, CacheTier};

use crate::error::Error;
use crate::single_flight::SingleFlight;

/// A cache that loads missing keys through a [`SingleFlight`] group in front of an
/// arbitrary [`CacheTier`] store (an [`crate::LruStore`] or [`crate::LfuStore`], typically).
///
/// See §4.5.
pub struct Cache<K, V, S> {
    store: S,
    single_flight: SingleFlight<K, V>,
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Wraps `store` with a fresh single-flight group.
    pub fn new(store: S) -> Self {
        Self { store, single_flight: SingleFlight::new() }
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: CacheTier<K, V> + Send + Sync,
{
    /// Returns the value for `key`, loading it through `loader` on a miss.
    ///
    /// On a store hit, returns the value directly (with the store's own usage-tracking
    /// side effect, e.g. LRU recency or LFU frequency). On a miss, coalesces concurrent
    /// callers for `key` through the single-flight group, runs `loader` at most once, and
    /// — only on success — writes the result back to the store. A loader failure is
    /// propagated to every waiting caller and the store is left untouched, so the next
    /// `get` retries the load (§4.5 failure policy).
    pub async fn get<F, Fut>(&self, key: &K, loader: F) -> Result<V, Error>
    where
        F: FnOnce(K) -> Fut + Send,
        Fut: Future<Output = Result<V, Error>> + Send,
    {
        if let Some(entry) = self.store.get(key).await {
            return Ok(entry.into_value());
        }

        let owned_key = key.clone();
        let value = self.single_flight.do_work(key.clone(), move || loader(owned_key)).await?;
        self.store.insert(key, CacheEntry::new(value.clone())).await;
        Ok(value)
    }

    /// Writes `value` for `key` directly to the store, bypassing the loader.
    pub async fn set(&self, key: &K, value: V) {
        self.store.insert(key, CacheEntry::new(value)).await;
    }

    /// Returns a reference to the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}
