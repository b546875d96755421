#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::cmd::{CommandResolve, Executable};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod bootstrap;
mod cmd;

#[derive(Parser)]
#[command(name = "marmot")]
#[command(version = "0.0.1")]
#[command(about = "Resolve hostnames of network targets in batch.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the addresses of targets
    Resolve {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// A file of targets, one per line
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Targets like 'https://example.com' or 'example.com:22'
        targets: Vec<String>,
    },
}

fn init() {
    pretty_env_logger::try_init_timed().ok();
}

/// Waits until the command finishes, a signal asks it to shut down gracefully first.
async fn wait<S>(
    mut handle: JoinHandle<anyhow::Result<()>>,
    shutdown: Arc<Notify>,
    signal: S,
) -> anyhow::Result<()>
where
    S: Future,
{
    let finished = tokio::select! {
        res = &mut handle => Some(res),
        _ = signal => None,
    };

    let res = match finished {
        Some(res) => res,
        None => {
            info!("received signal ctrl-c, wait for graceful shutdown...");
            shutdown.notify_one();
            handle.await
        }
    };

    res?
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let cli = Cli::parse();

    let shutdown = Arc::new(Notify::new());

    match cli.command {
        Commands::Resolve {
            config,
            file,
            json,
            targets,
        } => {
            let c = CommandResolve::new(config, file, json, targets);
            let handle = {
                let shutdown = Clone::clone(&shutdown);
                tokio::spawn(async move { c.execute(shutdown).await })
            };
            wait(handle, shutdown, tokio::signal::ctrl_c())
                .await
                .context("failed to execute command 'resolve'")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_failure() {
        init();

        let handle = tokio::spawn(async { Err::<(), _>(anyhow!("no target found")) });
        let res = wait(handle, Arc::new(Notify::new()), std::future::pending::<()>()).await;
        assert!(res.is_err_and(|e| e.to_string().contains("no target found")));

        let handle = tokio::spawn(async { anyhow::Ok(()) });
        let res = wait(handle, Arc::new(Notify::new()), std::future::pending::<()>()).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn test_wait_signal() {
        init();

        let shutdown = Arc::new(Notify::new());
        let handle = {
            let shutdown = Clone::clone(&shutdown);
            tokio::spawn(async move {
                shutdown.notified().await;
                Err::<(), _>(anyhow!("interrupted"))
            })
        };

        let res = wait(handle, shutdown, std::future::ready(())).await;
        assert!(res.is_err_and(|e| e.to_string().contains("interrupted")));
    }
}
