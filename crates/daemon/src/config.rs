// SPDX-License-Identifier: MIT

//! Runtime configuration: fixed paths under the user's runtime directory.
//! Wiring of concrete `Store`/`Ranker`/`Provider` implementations is out of
//! scope (spec.md §1); this only resolves filesystem layout.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a runtime directory for this user")]
    NoRuntimeDir,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime directory (mode 0o700) holding the lock, socket, PID, and log.
    pub runtime_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,

    pub burst_threshold: usize,
    pub window_ms: u64,
    pub quiet_period_ms: u64,
    pub sample_rate: u32,
    pub queue_capacity: usize,
    pub queue_drain_interval_ms: u64,
    pub max_snapshot_age_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Config {
    /// Loads configuration rooted at `$XDG_RUNTIME_DIR/clai` (falling back
    /// to `dirs::runtime_dir()` / a state-dir-style default), matching the
    /// teacher's `Config::load()` fixed-path convention.
    pub fn load() -> Result<Self, ConfigError> {
        let runtime_dir = runtime_dir()?.join("clai");
        Ok(Self::with_runtime_dir(runtime_dir))
    }

    pub fn with_runtime_dir(runtime_dir: PathBuf) -> Self {
        Self {
            socket_path: runtime_dir.join("clai.sock"),
            lock_path: runtime_dir.join("clai.lock"),
            pid_path: runtime_dir.join("clai.pid"),
            log_path: runtime_dir.join("clai.log"),
            runtime_dir,
            burst_threshold: 200,
            window_ms: 1_000,
            quiet_period_ms: 500,
            sample_rate: 4,
            queue_capacity: clai_core::IngestionQueue::DEFAULT_CAPACITY,
            queue_drain_interval_ms: 50,
            max_snapshot_age_ms: clai_core::SnapshotStore::DEFAULT_MAX_AGE_MS,
            idle_timeout_ms: 20 * 60 * 1_000,
        }
    }
}

fn runtime_dir() -> Result<PathBuf, ConfigError> {
    dirs::runtime_dir()
        .or_else(dirs::state_dir)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoRuntimeDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
