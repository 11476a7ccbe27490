// Copyright (c) Microsoft Corporation.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A bounded FIFO task queue served by a fixed worker pool, plus a line-delimited JSON
//! TCP demo server/client exercising it.
//!
//! - [`BoundedTaskQueue`]: the core primitive — see [`queue`].
//! - [`task`]: the fixed task-kind executors (`sum`, `hash`, `BurnCPUTask`, `slow_api`).
//! - [`wire`]: the request/response JSON framing shared by [`server`] and [`client`].
//!
//! # Example
//!
//! ```
//! use concur_queue::{BoundedTaskQueue, Task, TaskKind};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let queue = BoundedTaskQueue::new(8, 2, true).unwrap();
//! let task = Task { id: "1".to_string(), kind: TaskKind::Sum, input: json!({"a": 2, "b": 40}) };
//! let outcome = queue.put(task).unwrap().await.unwrap();
//! assert!(outcome.error.is_none());
//! queue.shutdown().await;
//! # }
//! ```

pub mod client;
mod error;
pub mod server;
mod task;
mod queue;
mod wire;

pub use client::{run as run_client, ClientConfig};
pub use error::{Error, ErrorKind, Result};
pub use queue::{BoundedTaskQueue, BoundedTaskQueueBuilder, WaitingObserver};
pub use server::run as run_server;
pub use task::{execute, Task, TaskKind, TaskOutcome};
pub use wire::{decode_request, decode_response, encode_request, encode_response};
