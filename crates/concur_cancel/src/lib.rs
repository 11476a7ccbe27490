// Copyright (c) Microsoft Corporation.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A driver-agnostic cancellable query: races an async operation against a deadline or
//! an explicit cancellation, guaranteeing the operation is joined before returning.
//!
//! - [`CancelSource`]: a single-terminal-state cancellation signal, optionally armed
//!   with a deadline via [`tick::Clock`].
//! - [`EmulatedDriver`] / [`QueryOperation`]: the seam a real driver implements.
//! - [`query_with_cancellation`]: the race itself.
//! - [`MockDriver`]: an in-memory driver for tests and demos.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use concur_cancel::{query_with_cancellation, CancelSource, MockBehavior, MockDriver};
//! use tick::Clock;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let driver = MockDriver::new(MockBehavior::Succeed { delay: Duration::from_millis(10) });
//! let clock = Clock::new_tokio();
//! let cancel_source = CancelSource::with_deadline(Duration::from_secs(1), &clock);
//!
//! let rows = query_with_cancellation(&driver, &cancel_source, "select 1", &[]).await.unwrap();
//! assert_eq!(rows.rows, vec!["select 1".to_string()]);
//! # }
//! ```

mod cancel_source;
mod error;
mod operation;
mod query;

pub use cancel_source::{CancelReason, CancelSource};
pub use error::{Error, ErrorKind, Result};
pub use operation::{EmulatedDriver, MockBehavior, MockDriver, MockOperation, QueryOperation, Rows};
pub use query::query_with_cancellation;
