// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{RankRequest, Suggestion};

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("ranker error: {0}")]
    Failed(String),
}

/// The V1 scoring engine: a pure function over a request, treated as an
/// external collaborator (its internal algorithm is out of scope).
#[async_trait]
pub trait Ranker: Send + Sync + 'static {
    async fn rank(&self, request: RankRequest) -> Result<Vec<Suggestion>, RankerError>;
}
