// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSuggestion {
    pub command: String,
    pub template_id: String,
    pub score: f64,
}

/// The scoring context shown to a user for a given `Suggest` call, kept so
/// that subsequent feedback can be tied back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestSnapshot {
    pub context: String,
    pub suggestions: Vec<RankedSuggestion>,
    pub shown_at_ms: u64,
}

/// Per-session store of the most recent suggestion snapshot. Entries older
/// than `max_snapshot_age_ms` are treated as gone the moment they're next
/// looked at, even though nothing proactively sweeps them.
pub struct SnapshotStore {
    max_snapshot_age_ms: u64,
    snapshots: Mutex<HashMap<SessionId, SuggestSnapshot>>,
}

impl SnapshotStore {
    /// spec.md §4.6: "a fixed bound, e.g. 10 minutes".
    pub const DEFAULT_MAX_AGE_MS: u64 = 10 * 60 * 1_000;

    pub fn new(max_snapshot_age_ms: u64) -> Self {
        Self { max_snapshot_age_ms, snapshots: Mutex::new(HashMap::new()) }
    }

    pub fn record(&self, session_id: SessionId, snapshot: SuggestSnapshot) {
        self.snapshots.lock().insert(session_id, snapshot);
    }

    /// Returns the live snapshot for a session, evicting and returning
    /// `None` if it has aged past `max_snapshot_age_ms`.
    pub fn get(&self, session_id: &SessionId, now_ms: u64) -> Option<SuggestSnapshot> {
        let mut snapshots = self.snapshots.lock();
        let is_stale = snapshots
            .get(session_id)
            .map(|s| now_ms.saturating_sub(s.shown_at_ms) > self.max_snapshot_age_ms)
            .unwrap_or(false);
        if is_stale {
            snapshots.remove(session_id);
            return None;
        }
        snapshots.get(session_id).cloned()
    }

    pub fn evict(&self, session_id: &SessionId) {
        self.snapshots.lock().remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
