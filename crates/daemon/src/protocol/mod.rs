// SPDX-License-Identifier: MIT

//! The RPC wire types. `Request`/`Response` are `#[serde(tag = "type")]`
//! enums, matching the teacher's `protocol.rs` style; framing itself lives
//! in [`crate::protocol::wire`].

pub mod wire;

use serde::{Deserialize, Serialize};

pub use wire::{read_request, write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE};

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Structured RPC error codes a caller can branch on, per spec.md §7.
pub const E_INVALID_REQUEST: &str = "E_INVALID_REQUEST";
pub const E_NO_FEEDBACK_STORE: &str = "E_NO_FEEDBACK_STORE";
pub const E_STORE_ERROR: &str = "E_STORE_ERROR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    SessionStart {
        session_id: String,
        shell: String,
        os: Option<String>,
        hostname: Option<String>,
        username: Option<String>,
        cwd: String,
    },
    SessionEnd {
        session_id: String,
    },
    CommandStarted {
        session_id: String,
        command_id: String,
        raw_text: String,
        cwd: Option<String>,
        repo_key: Option<String>,
        branch: Option<String>,
    },
    CommandEnded {
        session_id: String,
        command_id: String,
        exit_code: i32,
    },
    Suggest {
        session_id: String,
        cwd: String,
        shell: String,
        prefix: String,
        version: Option<String>,
        max_results: i64,
    },
    TextToCommand {
        session_id: String,
        prompt: String,
        cwd: String,
        shell: String,
    },
    NextStep {
        session_id: String,
        cwd: String,
        shell: String,
    },
    Diagnose {
        session_id: String,
        command: String,
        output: String,
        cwd: String,
        shell: String,
    },
    FetchHistory {
        session_id: Option<String>,
        global: bool,
        filter: Option<String>,
        limit: i64,
        offset: i64,
        mode: Option<String>,
    },
    ImportHistory {
        session_id: String,
        shell: String,
        if_not_exists: bool,
    },
    RecordFeedback {
        session_id: String,
        suggested_text: String,
        action: String,
    },
    SuggestFeedback {
        session_id: String,
        suggested_text: String,
        action: String,
    },
    Ping,
    GetStatus,
    WorkflowRunStart {
        run_id: String,
        name: String,
    },
    WorkflowStepUpdate {
        run_id: String,
        step: String,
        status: String,
    },
    WorkflowRunEnd {
        run_id: String,
        status: String,
    },
    AnalyzeStepOutput {
        run_id: String,
        step: String,
        output: String,
    },
    Shutdown,
}

impl Request {
    /// True for read-only query-shaped requests, which are logged at
    /// debug level instead of info to avoid flooding logs with polling.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Request::Suggest { .. }
                | Request::FetchHistory { .. }
                | Request::GetStatus
                | Request::Ping
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionWire {
    pub text: String,
    pub cmd_norm: String,
    pub score: f64,
    pub risk: String,
    pub reasons: Vec<String>,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryCommandWire {
    pub raw_text: String,
    pub cwd: String,
    pub started_at_ms: u64,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Error {
        code: Option<String>,
        message: String,
    },
    Suggestions {
        suggestions: Vec<SuggestionWire>,
    },
    TextToCommand {
        command: String,
        explanation: String,
    },
    NextStep {
        commands: Vec<String>,
        explanation: String,
    },
    Diagnose {
        explanation: String,
    },
    History {
        commands: Vec<HistoryCommandWire>,
        at_end: bool,
        backend: String,
    },
    ImportHistory {
        imported: usize,
        skipped: bool,
    },
    Feedback {
        ok: bool,
        code: Option<String>,
    },
    Pong,
    Status {
        version: String,
        active_sessions: usize,
        uptime_secs: u64,
        commands_logged: u64,
    },
    Workflow {
        run_id: String,
        status: String,
    },
    AnalyzeStepOutput {
        decision: String,
        reasoning: String,
    },
    ShuttingDown,
}

impl Response {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Response::Error { code: Some(code.to_string()), message: message.into() }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
