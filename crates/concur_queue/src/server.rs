// Copyright (c) Microsoft Corporation.

//! The demo TCP server: one accepted connection per client, one [`BoundedTaskQueue`]
//! shared across all connections. See §6.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::queue::BoundedTaskQueue;
use crate::task::TaskOutcome;
use crate::wire::{decode_request, encode_response};

/// Runs the server until a shutdown signal arrives, then drains the queue and returns.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot be bound.
pub async fn run(addr: &str, queue: Arc<BoundedTaskQueue>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let queue = Arc::clone(&queue);
                        tokio::spawn(async move {
                            tracing::debug!(%peer, "connection accepted");
                            handle_connection(stream, queue).await;
                            tracing::debug!(%peer, "connection closed");
                        });
                    }
                    Err(err) => tracing::warn!(%err, "accept failed"),
                }
            }
            () = wait_for_shutdown_signal() => {
                tracing::info!("shutdown signal received, draining queue");
                break;
            }
        }
    }

    queue.shutdown().await;
    Ok(())
}

/// Reads line-delimited requests from `stream`, submits each to `queue`, and writes
/// responses back through a single serializing writer task (§6's stated server behavior).
async fn handle_connection(stream: TcpStream, queue: Arc<BoundedTaskQueue>) {
    let (read_half, write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let (response_tx, mut response_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut write_half = write_half;
        while let Some(line) = response_rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if write_half.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => break,
        };

        match decode_request(&line) {
            Ok(task) => {
                let id = task.id.clone();
                match queue.put(task) {
                    Ok(completion) => {
                        let response_tx = response_tx.clone();
                        tokio::spawn(async move {
                            if let Ok(outcome) = completion.await {
                                send_response(&response_tx, &outcome);
                            }
                        });
                    }
                    Err(err) => send_response(&response_tx, &TaskOutcome::failure(id, err)),
                }
            }
            Err(err) => {
                // Malformed frame: report against an empty id and close the connection,
                // per the fixed `DecodeError` policy.
                send_response(&response_tx, &TaskOutcome::failure(String::new(), err));
                break;
            }
        }
    }

    drop(response_tx);
    drop(writer.await);
}

fn send_response(sender: &mpsc::UnboundedSender<String>, outcome: &TaskOutcome) {
    match encode_response(outcome) {
        Ok(line) => drop(sender.send(line)),
        Err(err) => tracing::warn!(%err, "failed to encode response"),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGTERM handler, falling back to SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
