// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// A live or ended session, as persisted by the V1 store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub shell: String,
    pub os: String,
    pub hostname: String,
    pub username: String,
    pub cwd: String,
    pub started_at_ms: u64,
    pub ended_at_ms: Option<u64>,
}

/// A command as persisted by the V1 store (created on `CommandStarted`,
/// completed on `CommandEnded`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command_id: String,
    pub session_id: String,
    pub raw_text: String,
    pub cmd_norm: String,
    pub cwd: String,
    pub repo_key: Option<String>,
    pub branch: Option<String>,
    pub started_at_ms: u64,
    pub ended_at_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub exit_code: Option<i32>,
}

/// Request context passed to [`crate::Ranker::rank`] and
/// [`crate::V2Scorer::score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestContext {
    pub session_id: String,
    pub cwd: String,
    pub shell: String,
    pub repo_key: Option<String>,
    pub branch: Option<String>,
    pub prefix: String,
    pub max_results: usize,
}

pub type RankRequest = SuggestContext;

/// A single ranked candidate returned by a scorer, before dispatcher-level
/// enrichment (risk tagging, reason strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub cmd_norm: Option<String>,
    pub template_id: Option<String>,
    pub score: f64,
    pub source: String,
    pub recency_ms: Option<u64>,
    pub frequency: Option<u64>,
    pub success_count: Option<u64>,
    pub failure_count: Option<u64>,
    pub description: Option<String>,
    pub risk: String,
}

/// Query parameters for [`crate::Store::query_history_commands`] and
/// [`crate::V2Scorer::search_history`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    pub filter_substring: Option<String>,
    pub global: bool,
    pub limit: usize,
    pub offset: usize,
    /// `Some("fts")` routes the query through [`crate::V2Scorer::search_history`]
    /// first (spec.md §4.7); `None`/anything else goes straight to the V1
    /// storage-backed substring search.
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResult {
    pub commands: Vec<CommandRecord>,
    pub at_end: bool,
    pub backend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedValue {
    pub value: serde_json::Value,
    pub expires_at_ms: Option<u64>,
}

/// Feedback submitted against a previously shown suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub session_id: String,
    pub suggested_text: String,
    pub action: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback: Feedback,
    pub learner_updated: bool,
}

/// A workflow run tracked by the optional workflow RPC surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub run_id: String,
    pub name: String,
    pub status: String,
    pub started_at_ms: u64,
    pub ended_at_ms: Option<u64>,
}
