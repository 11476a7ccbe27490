// Copyright (c) Microsoft Corporation.

//! Task descriptors, outcomes, and the fixed set of task-kind executors.
//!
//! The four kinds (`sum`, `hash`, `BurnCPUTask`, `slow_api`) are pure functions of a task's
//! kind and JSON payload; see §6. `hash` and `BurnCPUTask` are CPU-bound and run to
//! completion synchronously inside the worker; `slow_api` is the one kind that performs
//! its own I/O (a TCP round trip) and is therefore `async`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::Error;

/// A task kind, matching the fixed `type` vocabulary of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// `{a,b: int} -> {res: int}`.
    Sum,
    /// Repeated SHA-256 of the literal bytes `"benchmark"`.
    Hash,
    /// A CPU-bound LCG loop, echoing its input back as the result.
    BurnCpuTask,
    /// Dials `addr`, writes a newline, reads one line back.
    SlowApi,
}

impl TaskKind {
    /// Parses the wire `type` field into a [`TaskKind`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorKind::InvalidTaskKind`] for anything outside the fixed set.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        match raw {
            "sum" => Ok(Self::Sum),
            "hash" => Ok(Self::Hash),
            "BurnCPUTask" => Ok(Self::BurnCpuTask),
            "slow_api" => Ok(Self::SlowApi),
            other => Err(Error::invalid_task_kind(other)),
        }
    }

    /// Returns the wire `type` string for this kind.
    #[must_use]
    pub const fn as_wire_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Hash => "hash",
            Self::BurnCpuTask => "BurnCPUTask",
            Self::SlowApi => "slow_api",
        }
    }
}

/// A task submitted to a [`crate::BoundedTaskQueue`].
#[derive(Debug, Clone)]
pub struct Task {
    /// The caller-supplied correlation id, echoed back on the outcome.
    pub id: String,
    /// Which executor runs this task.
    pub kind: TaskKind,
    /// The kind-specific JSON payload.
    pub input: serde_json::Value,
}

/// The result of running a [`Task`] to completion, matching the wire response frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Echoes [`Task::id`].
    pub id: String,
    /// The task's result bytes, if it succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<u8>>,
    /// A human-readable failure message, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    /// Builds a successful outcome carrying `result`.
    #[must_use]
    pub const fn success(id: String, result: Vec<u8>) -> Self {
        Self { id, result: Some(result), error: None }
    }

    /// Builds a failed outcome carrying `error`'s message.
    #[must_use]
    pub fn failure(id: String, error: impl std::fmt::Display) -> Self {
        Self { id, result: None, error: Some(error.to_string()) }
    }
}

#[derive(Deserialize)]
struct SumInput {
    a: i64,
    b: i64,
}

#[derive(Serialize)]
struct SumOutput {
    res: i64,
}

#[derive(Deserialize)]
struct IterationInput {
    iteration: u64,
}

#[derive(Deserialize)]
struct SlowApiInput {
    addr: String,
}

/// Runs `task` to completion and returns its result bytes.
///
/// # Errors
///
/// Returns an error if the payload does not match the shape its kind expects, or (for
/// `slow_api`) if the TCP round trip fails.
pub async fn execute(task: &Task) -> Result<Vec<u8>, Error> {
    match task.kind {
        TaskKind::Sum => execute_sum(task),
        TaskKind::Hash => execute_hash(task),
        TaskKind::BurnCpuTask => execute_burn_cpu(task),
        TaskKind::SlowApi => execute_slow_api(task).await,
    }
}

fn execute_sum(task: &Task) -> Result<Vec<u8>, Error> {
    let input: SumInput = serde_json::from_value(task.input.clone()).map_err(Error::decode_error)?;
    let output = SumOutput { res: input.a + input.b };
    serde_json::to_vec(&output).map_err(Error::decode_error)
}

fn execute_hash(task: &Task) -> Result<Vec<u8>, Error> {
    let input: IterationInput = serde_json::from_value(task.input.clone()).map_err(Error::decode_error)?;
    let mut digest = Sha256::digest(b"benchmark");
    for _ in 1..input.iteration.max(1) {
        digest = Sha256::digest(b"benchmark");
    }
    Ok(digest.to_vec())
}

fn execute_burn_cpu(task: &Task) -> Result<Vec<u8>, Error> {
    let input: IterationInput = serde_json::from_value(task.input.clone()).map_err(Error::decode_error)?;
    let mut x: u32 = 1;
    for _ in 0..input.iteration {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    std::hint::black_box(x);
    serde_json::to_vec(&task.input).map_err(Error::decode_error)
}

async fn execute_slow_api(task: &Task) -> Result<Vec<u8>, Error> {
    let input: SlowApiInput = serde_json::from_value(task.input.clone()).map_err(Error::decode_error)?;
    let mut stream = TcpStream::connect(&input.addr).await.map_err(Error::task_failed)?;
    stream.write_all(b"\n").await.map_err(Error::task_failed)?;

    let mut reader = BufReader::new(&mut stream);
    let mut line = String::new();
    tokio::time::timeout(Duration::from_secs(30), reader.read_line(&mut line))
        .await
        .map_err(Error::task_failed)?
        .map_err(Error::task_failed)?;

    Ok(line.trim_end_matches(['\r', '\n']).as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_fixed_kind_vocabulary() {
        assert_eq!(TaskKind::parse("sum").unwrap(), TaskKind::Sum);
        assert_eq!(TaskKind::parse("hash").unwrap(), TaskKind::Hash);
        assert_eq!(TaskKind::parse("BurnCPUTask").unwrap(), TaskKind::BurnCpuTask);
        assert_eq!(TaskKind::parse("slow_api").unwrap(), TaskKind::SlowApi);
        assert!(TaskKind::parse("unknown").is_err());
    }

    #[tokio::test]
    async fn sum_adds_operands() {
        let task = Task { id: "1".to_string(), kind: TaskKind::Sum, input: json!({"a": 2, "b": 40}) };
        let result = execute(&task).await.unwrap();
        let output: serde_json::Value = serde_json::from_slice(&result).unwrap();
        assert_eq!(output["res"], 42);
    }

    #[tokio::test]
    async fn hash_returns_32_byte_digest() {
        let task = Task { id: "1".to_string(), kind: TaskKind::Hash, input: json!({"iteration": 5}) };
        let result = execute(&task).await.unwrap();
        assert_eq!(result.len(), 32);
    }

    #[tokio::test]
    async fn burn_cpu_echoes_input() {
        let task = Task { id: "1".to_string(), kind: TaskKind::BurnCpuTask, input: json!({"iteration": 1000}) };
        let result = execute(&task).await.unwrap();
        let output: serde_json::Value = serde_json::from_slice(&result).unwrap();
        assert_eq!(output["iteration"], 1000);
    }

    #[tokio::test]
    async fn malformed_sum_payload_is_an_error() {
        let task = Task { id: "1".to_string(), kind: TaskKind::Sum, input: json!({"a": "not a number"}) };
        assert!(execute(&task).await.is_err());
    }
}
