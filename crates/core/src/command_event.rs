// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Current wire/storage version of [`CommandEvent`]. Bump when the shape
/// changes in a way the batch writer's consumers need to branch on.
pub const COMMAND_EVENT_VERSION: u32 = 1;

/// A completed command, queued for asynchronous persistence into the V2
/// suggestions store. Constructed once, after the synchronous V1 write for
/// the same command has already succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub event_version: u32,
    pub event_type: CommandEventType,
    pub session_id: SessionId,
    pub shell: String,
    pub cwd: String,
    pub raw_text: String,
    pub repo_key: Option<String>,
    pub branch: Option<String>,
    pub exit_code: Option<i32>,
    pub duration_ms: Option<u64>,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandEventType {
    CommandEnd,
}

impl CommandEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        shell: String,
        cwd: String,
        raw_text: String,
        repo_key: Option<String>,
        branch: Option<String>,
        exit_code: Option<i32>,
        duration_ms: Option<u64>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            event_version: COMMAND_EVENT_VERSION,
            event_type: CommandEventType::CommandEnd,
            session_id,
            shell,
            cwd,
            raw_text,
            repo_key,
            branch,
            exit_code,
            duration_ms,
            timestamp_ms,
        }
    }
}
