// SPDX-License-Identifier: MIT

//! In-memory fakes for every collaborator trait, gated behind
//! `test-support` so sibling crates can depend on them in dev-dependencies
//! without pulling them into release builds.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::feedback_store::{FeedbackStore, FeedbackStoreError};
use crate::provider::{DiagnoseResult, NextStepResult, Provider, ProviderError, TextToCommandResult};
use crate::ranker::{Ranker, RankerError};
use crate::store::{Store, StoreError};
use crate::types::{
    CachedValue, CommandRecord, Feedback, FeedbackRecord, HistoryQuery, HistoryResult, RankRequest,
    SessionRecord, Suggestion, SuggestContext, WorkflowRecord,
};
use crate::v2_scorer::{V2Scorer, V2ScorerError};

/// A call recorded by [`FakeStore`], for assertions in handler tests.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CreateSession(String),
    EndSession(String),
    CreateCommand(String),
    UpdateCommandEnd(String),
    QueryHistoryCommands,
    ImportHistory(String),
}

#[derive(Default)]
struct FakeStoreState {
    sessions: HashMap<String, SessionRecord>,
    commands: HashMap<String, CommandRecord>,
    cache: HashMap<String, CachedValue>,
    workflows: HashMap<String, WorkflowRecord>,
    imported_shells: HashMap<String, Vec<String>>,
    calls: Vec<StoreCall>,
}

/// In-memory [`Store`] fake. Records every call for assertions.
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<FakeStoreState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    pub fn command(&self, command_id: &str) -> Option<CommandRecord> {
        self.inner.lock().commands.get(command_id).cloned()
    }

    pub fn seed_history(&self, shell: &str, session_id: &str, entries: Vec<String>) {
        self.inner.lock().imported_shells.insert(format!("{session_id}:{shell}"), entries);
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn create_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(StoreCall::CreateSession(session.session_id.clone()));
        inner.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn end_session(&self, session_id: &str, ended_at_ms: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(StoreCall::EndSession(session_id.to_string()));
        if let Some(session) = inner.sessions.get_mut(session_id) {
            session.ended_at_ms = Some(ended_at_ms);
        }
        Ok(())
    }

    async fn create_command(&self, command: CommandRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(StoreCall::CreateCommand(command.command_id.clone()));
        inner.commands.insert(command.command_id.clone(), command);
        Ok(())
    }

    async fn update_command_end(
        &self,
        command_id: &str,
        ended_at_ms: u64,
        duration_ms: u64,
        exit_code: i32,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(StoreCall::UpdateCommandEnd(command_id.to_string()));
        match inner.commands.get_mut(command_id) {
            Some(command) => {
                command.ended_at_ms = Some(ended_at_ms);
                command.duration_ms = Some(duration_ms);
                command.exit_code = Some(exit_code);
                Ok(())
            }
            None => Err(StoreError::NotFound(command_id.to_string())),
        }
    }

    async fn query_commands(&self, session_id: &str) -> Result<Vec<CommandRecord>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .commands
            .values()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn query_history_commands(&self, query: HistoryQuery) -> Result<HistoryResult, StoreError> {
        let mut inner_calls_guard = self.inner.lock();
        inner_calls_guard.calls.push(StoreCall::QueryHistoryCommands);
        let mut commands: Vec<CommandRecord> = inner_calls_guard
            .commands
            .values()
            .filter(|c| query.global || query.session_id.as_deref() == Some(c.session_id.as_str()))
            .filter(|c| {
                query
                    .filter_substring
                    .as_deref()
                    .map(|f| c.raw_text.to_lowercase().contains(&f.to_lowercase()))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        commands.sort_by_key(|c| c.started_at_ms);

        let total = commands.len();
        let start = query.offset.min(total);
        let take = (query.limit + 1).min(total.saturating_sub(start));
        let window: Vec<CommandRecord> = commands[start..start + take].to_vec();
        let at_end = window.len() <= query.limit;
        let commands = window.into_iter().take(query.limit).collect();

        Ok(HistoryResult { commands, at_end, backend: "storage".to_string() })
    }

    async fn has_imported_history(&self, session_id: &str, shell: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().imported_shells.contains_key(&format!("{session_id}:{shell}")))
    }

    async fn import_history(&self, session_id: &str, shell: &str, entries: Vec<String>) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(StoreCall::ImportHistory(session_id.to_string()));
        let count = entries.len();
        inner.imported_shells.insert(format!("{session_id}:{shell}"), entries);
        Ok(count)
    }

    async fn get_cached(&self, key: &str) -> Result<Option<CachedValue>, StoreError> {
        Ok(self.inner.lock().cache.get(key).cloned())
    }

    async fn set_cached(&self, key: &str, value: CachedValue) -> Result<(), StoreError> {
        self.inner.lock().cache.insert(key.to_string(), value);
        Ok(())
    }

    async fn prune_expired_cache(&self, now_ms: u64) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let before = inner.cache.len();
        inner.cache.retain(|_, v| v.expires_at_ms.map(|exp| exp > now_ms).unwrap_or(true));
        Ok(before - inner.cache.len())
    }

    async fn upsert_workflow(&self, record: WorkflowRecord) -> Result<(), StoreError> {
        self.inner.lock().workflows.insert(record.run_id.clone(), record);
        Ok(())
    }

    async fn get_workflow(&self, run_id: &str) -> Result<WorkflowRecord, StoreError> {
        self.inner
            .lock()
            .workflows
            .get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(run_id.to_string()))
    }
}

/// In-memory [`Ranker`] fake: returns a fixed, pre-programmed result list.
#[derive(Clone, Default)]
pub struct FakeRanker {
    inner: Arc<Mutex<Vec<Suggestion>>>,
}

impl FakeRanker {
    pub fn new(results: Vec<Suggestion>) -> Self {
        Self { inner: Arc::new(Mutex::new(results)) }
    }

    pub fn set_results(&self, results: Vec<Suggestion>) {
        *self.inner.lock() = results;
    }
}

#[async_trait]
impl Ranker for FakeRanker {
    async fn rank(&self, _request: RankRequest) -> Result<Vec<Suggestion>, RankerError> {
        Ok(self.inner.lock().clone())
    }
}

/// In-memory [`V2Scorer`] fake, same shape as [`FakeRanker`].
#[derive(Clone, Default)]
pub struct FakeV2Scorer {
    inner: Arc<Mutex<Vec<Suggestion>>>,
    fail: Arc<Mutex<bool>>,
    history: Arc<Mutex<Option<HistoryResult>>>,
    fail_history: Arc<Mutex<bool>>,
}

impl FakeV2Scorer {
    pub fn new(results: Vec<Suggestion>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(results)),
            fail: Arc::new(Mutex::new(false)),
            history: Arc::new(Mutex::new(None)),
            fail_history: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_results(&self, results: Vec<Suggestion>) {
        *self.inner.lock() = results;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn set_history_result(&self, result: HistoryResult) {
        *self.history.lock() = Some(result);
    }

    pub fn set_history_failing(&self, fail: bool) {
        *self.fail_history.lock() = fail;
    }
}

#[async_trait]
impl V2Scorer for FakeV2Scorer {
    async fn score(&self, _context: SuggestContext) -> Result<Vec<Suggestion>, V2ScorerError> {
        if *self.fail.lock() {
            return Err(V2ScorerError::Failed("fake failure".into()));
        }
        Ok(self.inner.lock().clone())
    }

    async fn search_history(&self, _query: HistoryQuery) -> Result<HistoryResult, V2ScorerError> {
        if *self.fail_history.lock() {
            return Err(V2ScorerError::Failed("fake fts failure".into()));
        }
        self.history
            .lock()
            .clone()
            .ok_or_else(|| V2ScorerError::Failed("no fts results programmed".into()))
    }
}

/// In-memory [`Provider`] fake: echoes the prompt back as the "command",
/// so tests can assert a provider was reached without modeling a real LLM.
#[derive(Clone)]
pub struct FakeProvider {
    name: String,
    available: Arc<Mutex<bool>>,
}

impl FakeProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), available: Arc::new(Mutex::new(true)) }
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn available(&self) -> bool {
        *self.available.lock()
    }

    async fn text_to_command(
        &self,
        prompt: &str,
        _context: &SuggestContext,
    ) -> Result<TextToCommandResult, ProviderError> {
        if !self.available().await {
            return Err(ProviderError::Unavailable(self.name.clone()));
        }
        Ok(TextToCommandResult { command: prompt.to_string(), explanation: "fake provider echo".into() })
    }

    async fn next_step(&self, _context: &SuggestContext) -> Result<NextStepResult, ProviderError> {
        if !self.available().await {
            return Err(ProviderError::Unavailable(self.name.clone()));
        }
        Ok(NextStepResult { commands: vec!["echo next".into()], explanation: "fake next step".into() })
    }

    async fn diagnose(
        &self,
        command: &str,
        _output: &str,
        _context: &SuggestContext,
    ) -> Result<DiagnoseResult, ProviderError> {
        if !self.available().await {
            return Err(ProviderError::Unavailable(self.name.clone()));
        }
        Ok(DiagnoseResult { explanation: format!("fake diagnosis for `{command}`") })
    }
}

/// In-memory [`FeedbackStore`] fake.
#[derive(Clone, Default)]
pub struct FakeFeedbackStore {
    inner: Arc<Mutex<Vec<FeedbackRecord>>>,
}

impl FakeFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for FakeFeedbackStore {
    async fn record_feedback(&self, feedback: Feedback, learner_updated: bool) -> Result<(), FeedbackStoreError> {
        self.inner.lock().push(FeedbackRecord { feedback, learner_updated });
        Ok(())
    }

    async fn query_feedback(&self, session_id: &str) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        Ok(self
            .inner
            .lock()
            .iter()
            .filter(|r| r.feedback.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "fakes_tests.rs"]
mod tests;
