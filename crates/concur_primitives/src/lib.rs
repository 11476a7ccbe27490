// Copyright (c) Microsoft Corporation.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Single-flight load deduplication and bounded LRU/LFU caches built on a one-shot Future.
//!
//! This crate provides the algorithmic core of a concurrency-primitives toolkit:
//!
//! - [`SharedFuture`]: a one-shot result cell awaited by many, produced by one.
//! - [`SingleFlight`]: deduplicates concurrent loads for the same key, built on
//!   [`uniflight::Merger`] with added panic safety.
//! - [`LruStore`] / [`LfuStore`]: bounded, hand-rolled eviction stores implementing
//!   [`cachelon_tier::CacheTier`], with O(1) touch/evict.
//! - [`Cache`]: composes a store with [`SingleFlight`] into `get`/`set` with miss-loading.
//!
//! # Example
//!
//! ```
//! use concur_primitives::{Cache, LruStore};
//!
//! # futures::executor::block_on(async {
//! let cache = Cache::new(LruStore::<String, i32>::new(100).unwrap());
//! let value = cache.get(&"key".to_string(), |_| async { Ok(42) }).await.unwrap();
//! assert_eq!(value, 42);
//! # });
//! ```

mod cache;
mod error;
mod future;
mod lfu;
mod lru;
mod single_flight;

pub use cache::Cache;
pub use error::{Error, ErrorKind, Result};
pub use future::SharedFuture;
pub use lfu::LfuStore;
pub use lru::{LruStore, DEFAULT_CAPACITY as LRU_DEFAULT_CAPACITY};
pub use single_flight::SingleFlight;
