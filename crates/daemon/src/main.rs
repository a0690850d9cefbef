// SPDX-License-Identifier: MIT

//! clai daemon (claid)
//!
//! Background process that owns session/command ingestion, suggestion
//! dispatch, and the V1/V2 suggestion stores' upkeep. Architecture mirrors
//! the teacher's `ojd`: a listener task handling socket I/O, plus a handful
//! of background tasks (batch writer, idle watcher, cache pruner) driven
//! from a `tokio::select!` engine loop in `main`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod batch_writer;
mod config;
mod dispatcher;
mod lifecycle;
mod listener;
mod lock;
mod protocol;
mod security;
mod shell_history;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;
use crate::lifecycle::{Deps, LifecycleError, StartupResult};
use crate::listener::Listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("claid {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: claid [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let deps = Deps {
        store: no_store_configured(),
        feedback_store: None,
        provider: None,
        ranker: None,
        v2_scorer: None,
        maintenance: Vec::new(),
    };

    let StartupResult { listener: unix_listener, ctx, mut lock, config, mut shutdown_rx } =
        match lifecycle::startup(deps).await {
            Ok(r) => r,
            Err(LifecycleError::Lock(e)) => {
                eprintln!("claid is already running ({e})");
                std::process::exit(1);
            }
            Err(e) => {
                error!(error = %e, "failed to start daemon");
                return Err(e.into());
            }
        };

    let _log_guard = setup_logging(&config)?;
    info!(socket = %config.socket_path.display(), "daemon ready");

    let listener = Listener::new(unix_listener, std::sync::Arc::clone(&ctx));
    tokio::spawn(listener.run());

    tokio::spawn(lifecycle::idle_watcher(std::sync::Arc::clone(&ctx), config.idle_timeout_ms));
    tokio::spawn(lifecycle::cache_pruner(std::sync::Arc::clone(&ctx)));
    tokio::spawn(lifecycle::queue_drain(
        std::sync::Arc::clone(&ctx),
        std::time::Duration::from_millis(config.queue_drain_interval_ms),
    ));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            _ = sighup.recv() => {
                info!("received SIGHUP, reloading configuration is not yet supported, ignoring");
            }
            _ = sigusr1.recv() => {
                info!("received SIGUSR1, re-executing in place");
                lifecycle::shutdown(&ctx, &config, &mut lock).await;
                if let Err(e) = lifecycle::reexec() {
                    error!(error = %e, "re-exec failed, continuing to run");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_ok() && *shutdown_rx.borrow() {
                    info!("idle timeout reached, shutting down");
                    break;
                }
            }
        }
    }

    lifecycle::shutdown(&ctx, &config, &mut lock).await;
    info!("daemon stopped");
    Ok(())
}

/// No concrete `Store` is wired yet: constructing and persisting a real
/// session/suggestion store is out of scope (spec.md §1, "treated as
/// external collaborators"). Embedding this daemon in a real deployment
/// means supplying `Deps` with a concrete `Store` before calling
/// `lifecycle::startup`; the standalone binary has nothing to embed it
/// with, so it refuses to run rather than silently operating on a store
/// that discards everything.
fn no_store_configured() -> std::sync::Arc<dyn clai_collab::Store> {
    eprintln!("claid: no Store implementation configured for this build, refusing to start");
    std::process::exit(1);
}

fn print_help() {
    println!("claid {}", env!("CARGO_PKG_VERSION"));
    println!("clai daemon - background process that owns session/command ingestion");
    println!("and suggestion dispatch over a Unix domain socket.");
    println!();
    println!("USAGE:");
    println!("    claid");
    println!();
    println!("claid is typically started by the `clai` CLI and should not be invoked");
    println!("directly.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or_else(|| LifecycleError::Io(std::io::Error::other("log path has no parent directory")))?,
        config
            .log_path
            .file_name()
            .ok_or_else(|| LifecycleError::Io(std::io::Error::other("log path has no file name")))?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
