// Copyright (c) Microsoft Corporation.

//! The demo TCP client: drives `concurrency` connections, each submitting its share of
//! `total` tasks sequentially, retrying on backpressure or decode failure.
//!
//! Grounded in the original's `queue/runner/client.go`: up to 5 attempts per task, a
//! reconnect on an I/O or decode failure, and a 200 ms sleep-then-retry on a
//! `QueueFull`/`QueueClosed` response.

use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::task::TaskKind;
use crate::wire::{decode_response, encode_request};

const MAX_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_millis(200);
const TASK_ROTATION: [TaskKind; 3] = [TaskKind::Sum, TaskKind::Hash, TaskKind::BurnCpuTask];

/// Configuration for a client run, matching the fixed CLI flag set (§6).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address to connect to.
    pub addr: String,
    /// Total number of tasks to submit across all connections.
    pub total: usize,
    /// Number of concurrent connections driving tasks.
    pub concurrency: usize,
    /// The `iteration`/operand parameter passed to each task.
    pub iterations: u64,
}

/// Runs the client to completion, returning the number of tasks that ultimately failed
/// after exhausting retries.
///
/// # Errors
///
/// Returns an I/O error only if the very first connection attempt for a worker fails
/// after all retries; individual task failures are counted, not raised.
pub async fn run(config: ClientConfig) -> std::io::Result<usize> {
    let concurrency = config.concurrency.max(1);
    let per_worker = config.total.div_ceil(concurrency);

    let mut workers = Vec::with_capacity(concurrency);
    for worker_id in 0..concurrency {
        let start = worker_id * per_worker;
        let end = (start + per_worker).min(config.total);
        if start >= end {
            continue;
        }
        let config = config.clone();
        workers.push(tokio::spawn(async move { run_worker(worker_id, start..end, &config).await }));
    }

    let mut failures = 0usize;
    for worker in workers {
        failures += worker.await.unwrap_or(0);
    }
    Ok(failures)
}

async fn run_worker(worker_id: usize, range: std::ops::Range<usize>, config: &ClientConfig) -> usize {
    let mut stream = match TcpStream::connect(&config.addr).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(%err, worker_id, "initial connect failed");
            return range.len();
        }
    };

    let mut failures = 0usize;
    for task_index in range {
        let kind = TASK_ROTATION[task_index % TASK_ROTATION.len()];
        let id = format!("{worker_id}-{task_index}");
        let input = match kind {
            TaskKind::Sum => json!({"a": task_index, "b": config.iterations}),
            TaskKind::Hash | TaskKind::BurnCpuTask => json!({"iteration": config.iterations}),
            TaskKind::SlowApi => json!({"addr": config.addr}),
        };

        match submit_with_retry(&mut stream, &config.addr, &id, kind, &input).await {
            Ok(outcome) if outcome.error.is_none() => {}
            Ok(outcome) => {
                tracing::warn!(id = %outcome.id, error = ?outcome.error, "task failed");
                failures += 1;
            }
            Err(err) => {
                tracing::warn!(%err, id, "task abandoned after retries");
                failures += 1;
            }
        }
    }
    failures
}

async fn submit_with_retry(
    stream: &mut TcpStream,
    addr: &str,
    id: &str,
    kind: TaskKind,
    input: &serde_json::Value,
) -> std::io::Result<crate::task::TaskOutcome> {
    let mut last_error = std::io::Error::other("no attempts made");

    for attempt in 0..MAX_ATTEMPTS {
        match send_one(stream, id, kind, input).await {
            Ok(outcome) => {
                let is_backpressure =
                    matches!(outcome.error.as_deref(), Some("queue is full") | Some("queue is closed"));
                if is_backpressure && attempt + 1 < MAX_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
                return Ok(outcome);
            }
            Err(err) => {
                last_error = err;
                if let Ok(reconnected) = TcpStream::connect(addr).await {
                    *stream = reconnected;
                }
            }
        }
    }
    Err(last_error)
}

async fn send_one(
    stream: &mut TcpStream,
    id: &str,
    kind: TaskKind,
    input: &serde_json::Value,
) -> std::io::Result<crate::task::TaskOutcome> {
    let request = encode_request(id, kind, input).map_err(std::io::Error::other)?;
    stream.write_all(request.as_bytes()).await?;
    stream.write_all(b"\n").await?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed by server"));
    }
    decode_response(line.trim_end()).map_err(std::io::Error::other)
}
