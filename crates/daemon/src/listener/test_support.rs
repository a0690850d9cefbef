// SPDX-License-Identifier: MIT

//! Shared test harness for listener handler tests: a `ListenCtx` wired to
//! in-memory fakes, plus a minimal fake [`BatchWriter`].

#![cfg(test)]

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use clai_collab::{BatchWriter, BatchWriterStats, FakeFeedbackStore, FakeProvider, FakeRanker, FakeStore, FakeV2Scorer};
use clai_core::{CircuitBreaker, CircuitBreakerConfig, CommandEvent, FakeClock, IngestionQueue, SessionRegistry, SnapshotStore};

use crate::dispatcher::Dispatcher;

use super::ListenCtx;

#[derive(Default)]
pub struct FakeBatchWriter {
    events: Mutex<Vec<CommandEvent>>,
}

impl FakeBatchWriter {
    pub fn events(&self) -> Vec<CommandEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl BatchWriter for FakeBatchWriter {
    async fn start(&self) {}
    async fn stop(&self) {}
    fn enqueue(&self, event: CommandEvent) {
        self.events.lock().push(event);
    }
    fn stats(&self) -> BatchWriterStats {
        let n = self.events.lock().len() as u64;
        BatchWriterStats { events_enqueued: n, events_written: n, events_dropped: 0 }
    }
}

pub struct Harness {
    pub ctx: ListenCtx,
    pub store: FakeStore,
    pub ranker: Arc<FakeRanker>,
    pub v2_scorer: Arc<FakeV2Scorer>,
    pub provider: Arc<FakeProvider>,
    pub feedback_store: Arc<FakeFeedbackStore>,
    pub batch_writer: Arc<FakeBatchWriter>,
    pub clock: Arc<FakeClock>,
}

pub fn harness() -> Harness {
    let store = FakeStore::new();
    let ranker = Arc::new(FakeRanker::new(Vec::new()));
    let v2_scorer = Arc::new(FakeV2Scorer::new(Vec::new()));
    let provider = Arc::new(FakeProvider::new("fake"));
    let feedback_store = Arc::new(FakeFeedbackStore::default());
    let batch_writer = Arc::new(FakeBatchWriter::default());
    let clock = Arc::new(FakeClock::new(1_000));
    let (shutdown_tx, _rx) = tokio::sync::watch::channel(false);

    let dispatcher = Dispatcher::new(Some(ranker.clone() as Arc<dyn clai_collab::Ranker>), Some(v2_scorer.clone() as Arc<dyn clai_collab::V2Scorer>));

    let ctx = ListenCtx {
        store: Arc::new(store.clone()),
        feedback_store: Some(feedback_store.clone() as Arc<dyn clai_collab::FeedbackStore>),
        provider: Some(provider.clone() as Arc<dyn clai_collab::Provider>),
        dispatcher,
        sessions: SessionRegistry::new(),
        queue: IngestionQueue::new(IngestionQueue::DEFAULT_CAPACITY),
        circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig::default()),
        snapshots: SnapshotStore::new(SnapshotStore::DEFAULT_MAX_AGE_MS),
        batch_writer: batch_writer.clone() as Arc<dyn BatchWriter>,
        clock: clock.clone() as Arc<dyn clai_core::Clock>,
        start_time: Instant::now(),
        last_activity_ms: AtomicU64::new(0),
        pending_commands: Mutex::new(HashMap::new()),
        shutdown: shutdown_tx,
    };

    Harness { ctx, store, ranker, v2_scorer, provider, feedback_store, batch_writer, clock }
}
