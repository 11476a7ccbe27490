// Copyright (c) Microsoft Corporation.

//! Demo binary exercising [`concur_queue::BoundedTaskQueue`] over a line-delimited JSON
//! TCP protocol, in either `server` or `client` mode. See §6.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use concur_queue::{run_client, run_server, BoundedTaskQueue, ClientConfig};

/// The fixed flag set from §6.
#[derive(Parser, Debug)]
#[command(name = "concur_queue", about = "Bounded task queue demo server/client")]
struct Cli {
    /// Whether to run as a server or a client.
    #[arg(long, value_enum)]
    mode: Mode,

    /// The address to bind (server) or dial (client).
    #[arg(long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Server: the bounded queue's depth.
    #[arg(long, default_value_t = 64)]
    capacity: usize,

    /// Server: the worker pool size.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Client: total tasks to submit.
    #[arg(long, default_value_t = 100)]
    total: usize,

    /// Client: number of concurrent connections.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Client: the iteration/operand parameter passed to each task.
    #[arg(long, default_value_t = 1000)]
    iterations: u64,

    /// Server: suppress per-task debug logging.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Server,
    Client,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::try_init().ok();
    let cli = Cli::parse();

    let outcome = match cli.mode {
        Mode::Server => run_as_server(&cli).await,
        Mode::Client => run_as_client(&cli).await.map(|_failures| ()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run_as_server(cli: &Cli) -> std::io::Result<()> {
    let queue = BoundedTaskQueue::new(cli.capacity, cli.workers, cli.quiet).map_err(std::io::Error::other)?;
    run_server(&cli.addr, Arc::new(queue)).await
}

async fn run_as_client(cli: &Cli) -> std::io::Result<usize> {
    let config = ClientConfig {
        addr: cli.addr.clone(),
        total: cli.total,
        concurrency: cli.concurrency,
        iterations: cli.iterations,
    };
    let failures = run_client(config).await?;
    if failures > 0 {
        tracing::warn!(failures, "some tasks did not complete successfully");
    }
    Ok(failures)
}
