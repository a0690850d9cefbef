// SPDX-License-Identifier: MIT

//! Single-instance enforcement via an advisory-locked PID file.
//!
//! Acquire sequence mirrors the teacher's `lifecycle::startup_inner`:
//! open-or-create without truncating, take a non-blocking exclusive lock,
//! only then write the PID. On contention, probe whether the recorded PID
//! is still alive; if not, the lock is stale, so remove the file and retry
//! once.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock already held by a running process (pid {0})")]
    AlreadyHeld(i32),
    #[error("io error acquiring lock at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// A held advisory lock on the runtime directory's PID file. Releasing is
/// idempotent: dropping, or calling [`LockGuard::release`] more than once,
/// is a no-op after the first release.
pub struct LockGuard {
    path: PathBuf,
    file: Option<File>,
}

impl LockGuard {
    /// Acquires the lock at `path`, auto-recovering a stale lock (held by a
    /// now-dead PID) exactly once before giving up.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        match try_acquire(path) {
            Ok(guard) => Ok(guard),
            Err(LockError::AlreadyHeld(pid)) if !pid_is_alive(pid) => {
                tracing::warn!(pid, path = %path.display(), "removing stale lock file");
                let _ = std::fs::remove_file(path);
                try_acquire(path)
            }
            other => other,
        }
    }

    /// Releases the lock: closes and unlinks the file. Safe to call more
    /// than once.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
            drop(file);
            let _ = std::fs::remove_file(&self.path);
        }
    }

    /// Reads the PID recorded in `path`, if the file exists and is
    /// currently held by some other process. Used by the CLI's `IsRunning`
    /// check when no in-process lock is held.
    pub fn read_held_pid(path: &Path) -> Option<i32> {
        let file = OpenOptions::new().read(true).open(path).ok()?;
        if file.try_lock_exclusive().is_ok() {
            // Nobody holds it; not "held".
            let _ = fs2::FileExt::unlock(&file);
            return None;
        }
        read_pid(path)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

fn try_acquire(path: &Path) -> Result<LockGuard, LockError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode_for_lock()
        .open(path)
        .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;

    if file.try_lock_exclusive().is_err() {
        let pid = read_pid(path).unwrap_or(0);
        return Err(LockError::AlreadyHeld(pid));
    }

    let mut file = file;
    file.set_len(0).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
    file.seek(SeekFrom::Start(0)).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
    writeln!(file, "{}", std::process::id()).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
    file.flush().map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = file.set_permissions(std::fs::Permissions::from_mode(0o600));
    }

    Ok(LockGuard { path: path.to_path_buf(), file: Some(file) })
}

fn read_pid(path: &Path) -> Option<i32> {
    let mut contents = String::new();
    File::open(path).ok()?.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

fn pid_is_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

/// Small extension trait so `try_acquire` reads as a single fluent chain;
/// the mode itself is applied post-open since `OpenOptions::mode` is
/// Unix-only and we want the default create mode, then fixed up to 0o600.
trait OpenOptionsExt2 {
    fn mode_for_lock(self) -> Self;
}

impl OpenOptionsExt2 for OpenOptions {
    fn mode_for_lock(self) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            return self.mode(0o600);
        }
        #[cfg(not(unix))]
        self
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
