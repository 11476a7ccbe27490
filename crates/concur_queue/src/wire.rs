// Copyright (c) Microsoft Corporation.

//! Line-delimited JSON request/response framing for the demo TCP server and client.
//!
//! See §6. A request's `input` field may be either a JSON value directly or a
//! base64-encoded string of the payload's JSON bytes; a response's `result` is always
//! base64-encoded so arbitrary binary results (e.g. a SHA-256 digest) round-trip as text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::task::{Task, TaskKind, TaskOutcome};

#[derive(Deserialize)]
struct RequestFrame {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    input: serde_json::Value,
}

#[derive(Serialize)]
struct ResponseFrame {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    error: String,
}

/// Parses one line of the wire protocol into a [`Task`].
///
/// # Errors
///
/// Returns [`crate::ErrorKind::DecodeError`] on malformed JSON, an unrecognized `type`, or
/// an `input` string that does not base64-decode to valid JSON.
pub fn decode_request(line: &str) -> Result<Task, Error> {
    let frame: RequestFrame = serde_json::from_str(line).map_err(Error::decode_error)?;
    let kind = TaskKind::parse(&frame.kind)?;
    let input = match frame.input {
        serde_json::Value::String(encoded) => {
            let bytes = STANDARD.decode(&encoded).map_err(Error::decode_error)?;
            serde_json::from_slice(&bytes).map_err(Error::decode_error)?
        }
        other => other,
    };
    Ok(Task { id: frame.id, kind, input })
}

/// Serializes a request for [`decode_request`], encoding `input` as a raw JSON value.
///
/// Used by the demo client; not part of the server's read path.
pub fn encode_request(id: &str, kind: TaskKind, input: &serde_json::Value) -> Result<String, Error> {
    let frame = RequestFrame { id: id.to_string(), kind: kind.as_wire_str().to_string(), input: input.clone() };
    serde_json::to_string(&frame).map_err(Error::decode_error)
}

/// Serializes a [`TaskOutcome`] into one response line.
///
/// # Errors
///
/// Returns [`crate::ErrorKind::DecodeError`] if the outcome's own fields (never expected
/// in practice) fail to serialize.
pub fn encode_response(outcome: &TaskOutcome) -> Result<String, Error> {
    let frame = ResponseFrame {
        id: outcome.id.clone(),
        result: outcome.result.as_ref().map(|bytes| STANDARD.encode(bytes)),
        error: outcome.error.clone().unwrap_or_default(),
    };
    serde_json::to_string(&frame).map_err(Error::decode_error)
}

/// Parses one line of the wire protocol's response side.
///
/// Used by the demo client to decode what the server sends back.
///
/// # Errors
///
/// Returns [`crate::ErrorKind::DecodeError`] on malformed JSON or an invalid base64 `result`.
pub fn decode_response(line: &str) -> Result<TaskOutcome, Error> {
    let frame: ResponseFrame = serde_json::from_str(line).map_err(Error::decode_error)?;
    let result = frame.result.map(|encoded| STANDARD.decode(encoded)).transpose().map_err(Error::decode_error)?;
    Ok(TaskOutcome { id: frame.id, result, error: if frame.error.is_empty() { None } else { Some(frame.error) } })
}
