// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Collaborator traits consumed by `clai-daemon`: the V1/V2 stores, the two
//! scoring engines, AI providers, the feedback store, the batch writer, and
//! the maintenance runner. Every type here is a capability the core holds
//! by trait object, never by concrete type, so the daemon can be tested
//! against in-memory fakes.

pub mod batch_writer;
pub mod feedback_store;
pub mod maintenance_runner;
pub mod provider;
pub mod ranker;
pub mod store;
pub mod types;
pub mod v2_scorer;

pub use batch_writer::{BatchWriter, BatchWriterStats};
pub use feedback_store::{FeedbackStore, FeedbackStoreError};
pub use maintenance_runner::MaintenanceRunner;
pub use provider::{Provider, ProviderError};
pub use ranker::Ranker;
pub use store::{Store, StoreError};
pub use types::{
    CachedValue, CommandRecord, Feedback, FeedbackRecord, HistoryQuery, HistoryResult,
    RankRequest, SessionRecord, Suggestion, SuggestContext, WorkflowRecord,
};
pub use v2_scorer::V2Scorer;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
#[cfg(any(test, feature = "test-support"))]
pub use fakes::{
    FakeFeedbackStore, FakeProvider, FakeRanker, FakeStore, FakeV2Scorer, StoreCall,
};
