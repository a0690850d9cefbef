// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{HistoryQuery, HistoryResult, Suggestion, SuggestContext};

#[derive(Debug, Error)]
pub enum V2ScorerError {
    #[error("v2 scorer error: {0}")]
    Failed(String),
}

/// The richer V2 scoring engine. Its presence at server-construction time
/// selects the default suggestion version (spec.md §4.6).
#[async_trait]
pub trait V2Scorer: Send + Sync + 'static {
    async fn score(&self, context: SuggestContext) -> Result<Vec<Suggestion>, V2ScorerError>;

    /// Full-text search over the V2 suggestions store, with pagination
    /// (spec.md §4.7's "V2 FTS mode"). Scorers that don't index command
    /// text for search can leave this unimplemented; `FetchHistory` falls
    /// back to the V1 storage-backed query on `Err`.
    async fn search_history(&self, _query: HistoryQuery) -> Result<HistoryResult, V2ScorerError> {
        Err(V2ScorerError::Failed("fts search not supported by this v2 scorer".into()))
    }
}
