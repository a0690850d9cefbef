// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{CachedValue, CommandRecord, HistoryQuery, HistoryResult, SessionRecord, WorkflowRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// The authoritative V1 history store: SQL-backed in production, held by
/// the daemon only through this trait.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn create_session(&self, session: SessionRecord) -> Result<(), StoreError>;
    async fn end_session(&self, session_id: &str, ended_at_ms: u64) -> Result<(), StoreError>;

    async fn create_command(&self, command: CommandRecord) -> Result<(), StoreError>;
    async fn update_command_end(
        &self,
        command_id: &str,
        ended_at_ms: u64,
        duration_ms: u64,
        exit_code: i32,
    ) -> Result<(), StoreError>;

    async fn query_commands(&self, session_id: &str) -> Result<Vec<CommandRecord>, StoreError>;
    async fn query_history_commands(&self, query: HistoryQuery) -> Result<HistoryResult, StoreError>;

    async fn has_imported_history(&self, session_id: &str, shell: &str) -> Result<bool, StoreError>;
    async fn import_history(&self, session_id: &str, shell: &str, entries: Vec<String>) -> Result<usize, StoreError>;

    async fn get_cached(&self, key: &str) -> Result<Option<CachedValue>, StoreError>;
    async fn set_cached(&self, key: &str, value: CachedValue) -> Result<(), StoreError>;
    async fn prune_expired_cache(&self, now_ms: u64) -> Result<usize, StoreError>;

    /// Workflow bookkeeping is optional: stores that don't track workflows
    /// can return `NotFound` rather than implementing real persistence.
    async fn upsert_workflow(&self, _record: WorkflowRecord) -> Result<(), StoreError> {
        Err(StoreError::Backend("workflow tracking not supported".into()))
    }
    async fn get_workflow(&self, run_id: &str) -> Result<WorkflowRecord, StoreError> {
        Err(StoreError::NotFound(run_id.to_string()))
    }
}
