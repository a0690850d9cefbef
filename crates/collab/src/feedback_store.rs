// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Feedback, FeedbackRecord};

#[derive(Debug, Error)]
pub enum FeedbackStoreError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Persists user feedback linked to a prior suggestion.
#[async_trait]
pub trait FeedbackStore: Send + Sync + 'static {
    async fn record_feedback(&self, feedback: Feedback, learner_updated: bool) -> Result<(), FeedbackStoreError>;
    async fn query_feedback(&self, session_id: &str) -> Result<Vec<FeedbackRecord>, FeedbackStoreError>;
}
