// SPDX-License-Identifier: MIT

//! Asynchronous persister feeding the V2 suggestions store (spec.md §4.5).
//!
//! Grounded on the teacher's `spawn_checkpoint`/`spawn_flush_task` background
//! tasks: a `tokio::spawn`'d loop draining an `mpsc::Receiver`, a mutex-
//! guarded stats counter, and a `stop()` that closes the sender half and
//! awaits the worker so every enqueued event is accounted for.
//!
//! There is no dedicated "V2 store" write trait in `clai-collab` (only the
//! read-side `Ranker`/`V2Scorer`); this writer persists through
//! [`clai_collab::Store::set_cached`], keying each event so the V2 read
//! path can later reconstruct a recency/frequency table from the cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use clai_collab::{BatchWriter, BatchWriterStats, CachedValue, Store};
use clai_core::CommandEvent;

const CHANNEL_CAPACITY: usize = 1024;

/// `tokio::spawn`-backed [`BatchWriter`]. `Clone`able: all clones share the
/// same channel, counters, and worker handle.
pub struct DaemonBatchWriter {
    store: Arc<dyn Store>,
    sender: mpsc::Sender<CommandEvent>,
    handle: AsyncMutex<Option<(mpsc::Sender<CommandEvent>, tokio::task::JoinHandle<()>)>>,
    enqueued: Arc<AtomicU64>,
    written: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl DaemonBatchWriter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let (sender, _receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            store,
            sender,
            handle: AsyncMutex::new(None),
            enqueued: Arc::new(AtomicU64::new(0)),
            written: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl BatchWriter for DaemonBatchWriter {
    async fn start(&self) {
        let mut guard = self.handle.lock().await;
        if guard.is_some() {
            return;
        }

        let (sender, mut receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let store = Arc::clone(&self.store);
        let written = Arc::clone(&self.written);
        let dropped = Arc::clone(&self.dropped);

        let worker = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                match persist(&store, &event).await {
                    Ok(()) => {
                        written.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to persist V2 command event, dropping");
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });

        *guard = Some((sender, worker));
    }

    async fn stop(&self) {
        let taken = self.handle.lock().await.take();
        if let Some((sender, worker)) = taken {
            drop(sender);
            let _ = worker.await;
        }
    }

    fn enqueue(&self, event: CommandEvent) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);

        let sender = {
            // Prefer the started worker's sender; fall back to the
            // construction-time sender (whose receiver was dropped, so the
            // send fails immediately) when `start()` hasn't run yet — this
            // keeps `enqueue` callable from any ordering without a panic.
            match self.handle.try_lock() {
                Ok(guard) => guard.as_ref().map(|(s, _)| s.clone()).unwrap_or_else(|| self.sender.clone()),
                Err(_) => self.sender.clone(),
            }
        };

        if sender.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn stats(&self) -> BatchWriterStats {
        BatchWriterStats {
            events_enqueued: self.enqueued.load(Ordering::Relaxed),
            events_written: self.written.load(Ordering::Relaxed),
            events_dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

async fn persist(store: &Arc<dyn Store>, event: &CommandEvent) -> Result<(), clai_collab::StoreError> {
    let key = format!("v2:event:{}:{}", event.session_id.as_str(), event.timestamp_ms);
    let value = serde_json::to_value(event).map_err(|e| clai_collab::StoreError::Backend(e.to_string()))?;
    store.set_cached(&key, CachedValue { value, expires_at_ms: None }).await
}

#[cfg(test)]
#[path = "batch_writer_tests.rs"]
mod tests;
