// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::define_id;

define_id!(SessionId);

/// The last command stashed against a session, used to correlate a
/// follow-up suggestion request with the command that triggered it
/// (spec.md §3). Captured at `CommandStarted`, before the exit code is
/// known — suggestion context cares what was run and where, not how it
/// turned out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCommand {
    pub command_id: String,
    pub raw_text: String,
    pub cwd: String,
    pub repo_key: Option<String>,
    pub branch: Option<String>,
    pub timestamp_ms: u64,
}

/// A live shell session tracked by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub shell: String,
    pub cwd: String,
    pub started_at_ms: u64,
    pub last_active_ms: u64,
    pub last_command: Option<LastCommand>,
}

impl SessionInfo {
    fn new(session_id: SessionId, shell: String, cwd: String, now_ms: u64) -> Self {
        Self {
            session_id,
            shell,
            cwd,
            started_at_ms: now_ms,
            last_active_ms: now_ms,
            last_command: None,
        }
    }
}

/// In-memory registry of live shell sessions.
///
/// Reads return deep copies so callers never observe a registry mutation
/// mid-read and never hold a reference that could outlive the lock guard.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionInfo>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session, overwriting any existing session with the
    /// same id.
    pub fn start(&self, session_id: SessionId, shell: String, cwd: String, now_ms: u64) {
        let info = SessionInfo::new(session_id.clone(), shell, cwd, now_ms);
        self.sessions.lock().insert(session_id, info);
    }

    /// Removes a session. Returns the removed record, if any.
    pub fn end(&self, session_id: &SessionId) -> Option<SessionInfo> {
        self.sessions.lock().remove(session_id)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<SessionInfo> {
        self.sessions.lock().get(session_id).cloned()
    }

    pub fn exists(&self, session_id: &SessionId) -> bool {
        self.sessions.lock().contains_key(session_id)
    }

    /// Refreshes `last_active_ms`. A silent no-op if the session is unknown:
    /// callers touch opportunistically and a race with session teardown is
    /// expected, not exceptional.
    pub fn touch(&self, session_id: &SessionId, now_ms: u64) {
        if let Some(info) = self.sessions.lock().get_mut(session_id) {
            info.last_active_ms = now_ms;
        }
    }

    /// Updates the tracked working directory, also touching the session.
    /// A silent no-op if the session is unknown.
    pub fn update_cwd(&self, session_id: &SessionId, cwd: String, now_ms: u64) {
        if let Some(info) = self.sessions.lock().get_mut(session_id) {
            info.cwd = cwd;
            info.last_active_ms = now_ms;
        }
    }

    /// Stashes the most recent command run in a session. A silent no-op if
    /// the session is unknown.
    pub fn stash_command(&self, session_id: &SessionId, command: LastCommand) {
        if let Some(info) = self.sessions.lock().get_mut(session_id) {
            info.last_active_ms = info.last_active_ms.max(command.timestamp_ms);
            info.last_command = Some(command);
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Ids of all live sessions, in no particular order.
    pub fn list(&self) -> Vec<SessionId> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Deep-copied snapshot of every live session.
    pub fn get_all(&self) -> Vec<SessionInfo> {
        self.sessions.lock().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
