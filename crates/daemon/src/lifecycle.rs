// SPDX-License-Identifier: MIT

//! Daemon lifecycle: startup ordering, signal-driven reload/shutdown/
//! re-exec, idle auto-termination, and periodic cache pruning.
//!
//! Directly grounded on the teacher's `lifecycle.rs` (`startup`/
//! `startup_inner` ordered steps, `cleanup_on_failure` on early return) and
//! `main.rs`'s signal registration plus `tokio::select!` engine loop. The
//! teacher only reacts to SIGTERM/SIGINT; SIGHUP/SIGUSR1/SIGPIPE handling
//! and the idle watcher / cache pruner are additive (spec.md §4.8).

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::watch;
use tracing::{info, warn};

use clai_collab::{BatchWriter, FeedbackStore, MaintenanceRunner, Provider, Ranker, Store, V2Scorer};
use clai_core::{CircuitBreaker, CircuitBreakerConfig, Clock as _, IngestionQueue, SessionRegistry, SnapshotStore, SystemClock};

use crate::config::{Config, ConfigError};
use crate::dispatcher::Dispatcher;
use crate::listener::{ListenCtx, Listener};
use crate::lock::{LockError, LockGuard};
use crate::security::{self, SecurityError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Security(#[from] SecurityError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("failed to bind socket at {path}: {source}")]
    Bind { path: std::path::PathBuf, #[source] source: std::io::Error },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("re-exec failed: {0}")]
    ReExec(#[source] nix::errno::Errno),
}

/// External collaborators the daemon is generic over (spec.md §1's
/// "explicitly out of scope" list). Only `store` is mandatory; everything
/// else degrades to a documented fallback behavior when absent.
pub struct Deps {
    pub store: Arc<dyn Store>,
    pub feedback_store: Option<Arc<dyn FeedbackStore>>,
    pub provider: Option<Arc<dyn Provider>>,
    pub ranker: Option<Arc<dyn Ranker>>,
    pub v2_scorer: Option<Arc<dyn V2Scorer>>,
    pub maintenance: Vec<Arc<dyn MaintenanceRunner>>,
}

/// Everything `startup` produces: the bound listener plus the shared
/// context it was built from. The caller (`main.rs`) spawns the listener
/// task and drives the signal/idle/prune loop around it.
pub struct StartupResult {
    pub listener: UnixListener,
    pub ctx: Arc<ListenCtx>,
    pub lock: LockGuard,
    pub config: Config,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Runs the ordered startup sequence (spec.md §4.8):
/// 1. Load configuration.
/// 2. Refuse to run as root.
/// 3. Ensure the runtime directory exists and is mode 0o700.
/// 4. Acquire the single-instance lock.
/// 5. Remove any stale socket file and bind a fresh one.
/// 6. Construct the shared `ListenCtx`.
///
/// On any failure after the lock is acquired, the lock and any partially
/// created socket are cleaned up before returning, mirroring the teacher's
/// `cleanup_on_failure` (which likewise never touches files belonging to an
/// already-running daemon — a `LockError::AlreadyHeld` skips cleanup).
pub async fn startup(deps: Deps) -> Result<StartupResult, LifecycleError> {
    let config = Config::load()?;
    match startup_inner(config.clone(), deps).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::Lock(LockError::AlreadyHeld(_))) {
                cleanup_on_failure(&config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: Config, deps: Deps) -> Result<StartupResult, LifecycleError> {
    security::refuse_root()?;
    security::ensure_private_dir(&config.runtime_dir)?;

    let lock = LockGuard::acquire(&config.lock_path)?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|source| LifecycleError::Bind { path: config.socket_path.clone(), source })?;

    let dispatcher = Dispatcher::new(deps.ranker, deps.v2_scorer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let batch_writer = Arc::new(crate::batch_writer::DaemonBatchWriter::new(Arc::clone(&deps.store)));
    let maintenance = deps.maintenance;

    let ctx = Arc::new(ListenCtx {
        store: deps.store,
        feedback_store: deps.feedback_store,
        provider: deps.provider,
        dispatcher,
        sessions: SessionRegistry::new(),
        queue: IngestionQueue::new(config.queue_capacity),
        circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig {
            burst_threshold: config.burst_threshold,
            window_ms: config.window_ms,
            quiet_period_ms: config.quiet_period_ms,
            sample_rate: config.sample_rate,
        }),
        snapshots: SnapshotStore::new(config.max_snapshot_age_ms),
        batch_writer: batch_writer as Arc<dyn BatchWriter>,
        clock: Arc::new(SystemClock),
        start_time: Instant::now(),
        last_activity_ms: AtomicU64::new(SystemClock.now_ms()),
        pending_commands: Mutex::new(HashMap::new()),
        shutdown: shutdown_tx,
    });

    ctx.batch_writer.start().await;

    for runner in maintenance {
        let shutdown_rx = ctx.shutdown.subscribe();
        tokio::spawn(async move { runner.run(shutdown_rx).await });
    }

    info!(socket = %config.socket_path.display(), "daemon ready");

    Ok(StartupResult { listener, ctx, lock, config, shutdown_rx })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
}

/// Gracefully tears down the daemon: stops the batch writer (draining all
/// pending events), removes the socket file, and releases the lock
/// (dropping `lock` unlinks the lock/PID file). Idempotent: safe to call
/// more than once, matching `LockGuard::release`'s idempotence.
pub async fn shutdown(ctx: &ListenCtx, config: &Config, lock: &mut LockGuard) {
    info!("shutting down daemon");
    ctx.batch_writer.stop().await;

    if config.socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.socket_path) {
            warn!(error = %e, "failed to remove socket file");
        }
    }

    lock.release();
    info!("daemon stopped");
}

/// Background task: fires `ctx.shutdown` once no session has touched the
/// daemon for `idle_timeout_ms` (spec.md §4.8). Runs until shutdown.
pub async fn idle_watcher(ctx: Arc<ListenCtx>, idle_timeout_ms: u64) {
    let mut shutdown = ctx.shutdown.subscribe();
    let mut tick = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = ctx.now_ms();
                let last = ctx.last_activity_ms.load(std::sync::atomic::Ordering::Relaxed);
                if ctx.sessions.active_count() == 0 && now.saturating_sub(last) >= idle_timeout_ms {
                    info!(idle_timeout_ms, "idle timeout reached, requesting shutdown");
                    let _ = ctx.shutdown.send(true);
                    return;
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

/// Background task: drains the ingestion queue into the batch writer
/// (spec.md §4.4), admitting each item through the circuit breaker first.
/// Runs on a short fixed tick rather than waking per-enqueue, matching the
/// teacher's other periodic maintenance tasks.
pub async fn queue_drain(ctx: Arc<ListenCtx>, tick_interval: Duration) {
    let mut shutdown = ctx.shutdown.subscribe();
    let mut tick = tokio::time::interval(tick_interval);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                crate::listener::drain_queue(&ctx);
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    crate::listener::drain_queue(&ctx);
                    return;
                }
            }
        }
    }
}

/// Background task: prunes expired V1-store cache entries hourly.
pub async fn cache_pruner(ctx: Arc<ListenCtx>) {
    let mut shutdown = ctx.shutdown.subscribe();
    let mut tick = tokio::time::interval(Duration::from_secs(60 * 60));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = ctx.now_ms();
                match ctx.store.prune_expired_cache(now).await {
                    Ok(n) if n > 0 => info!(pruned = n, "pruned expired cache entries"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "cache prune failed"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

/// Re-execs the current binary in place (SIGUSR1), preserving argv and the
/// environment. True in-place `execve` rather than a spawn-detached-child
/// fallback (SPEC_FULL.md §9's documented choice): no observable socket gap,
/// and the caller never returns on success.
///
/// A client disconnecting mid-write already surfaces as a plain
/// `std::io::Error` rather than killing the daemon: the standard runtime
/// ignores SIGPIPE for every Rust process at startup, so there is nothing
/// for the daemon to additionally install here.
pub fn reexec() -> Result<(), LifecycleError> {
    let exe = std::env::current_exe()?;
    let mut args = Vec::with_capacity(std::env::args_os().count());
    for arg in std::env::args_os() {
        let arg = std::ffi::CString::new(arg.as_encoded_bytes()).map_err(|_| LifecycleError::ReExec(nix::errno::Errno::EINVAL))?;
        args.push(arg);
    }
    let path = std::ffi::CString::new(exe.as_os_str().as_encoded_bytes()).map_err(|_| LifecycleError::ReExec(nix::errno::Errno::EINVAL))?;
    nix::unistd::execv(&path, &args).map_err(LifecycleError::ReExec)?;
    unreachable!("execv only returns on error")
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
