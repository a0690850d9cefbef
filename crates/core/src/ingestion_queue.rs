// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// An opaque queued item: a type tag, a JSON payload, and the time it was
/// enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionQueueStats {
    pub len: usize,
    pub cap: usize,
    pub total_enqueued: u64,
    pub total_dequeued: u64,
    pub total_dropped: u64,
}

struct Inner {
    items: VecDeque<QueueEvent>,
    total_enqueued: u64,
    total_dequeued: u64,
    total_dropped: u64,
    /// True once occupancy has crossed the 75% watermark without having
    /// fallen back below it since; gates the warning so it only fires once
    /// per crossing.
    watermark_armed: bool,
}

/// Bounded FIFO queue between RPC handlers and the batch writer. On overflow
/// the oldest entry is dropped to make room for the newest, never the
/// reverse.
pub struct IngestionQueue {
    cap: usize,
    inner: Mutex<Inner>,
}

impl IngestionQueue {
    pub const DEFAULT_CAPACITY: usize = 8192;

    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(cap.min(1024)),
                total_enqueued: 0,
                total_dequeued: 0,
                total_dropped: 0,
                watermark_armed: true,
            }),
        }
    }

    /// Enqueues `event`. Returns `true` iff enqueuing this event dropped an
    /// older one to stay within capacity.
    pub fn enqueue(&self, event: QueueEvent) -> bool {
        let mut inner = self.inner.lock();
        let mut dropped = false;
        if inner.items.len() >= self.cap {
            inner.items.pop_front();
            inner.total_dropped += 1;
            dropped = true;
            tracing::warn!(cap = self.cap, "ingestion queue full, dropping oldest event");
        }
        inner.items.push_back(event);
        inner.total_enqueued += 1;

        let occupancy = inner.items.len() as f64 / self.cap.max(1) as f64;
        if occupancy >= 0.75 {
            if inner.watermark_armed {
                inner.watermark_armed = false;
                tracing::warn!(occupancy, "ingestion queue at or above 75% occupancy");
            }
        } else {
            inner.watermark_armed = true;
        }

        dropped
    }

    pub fn dequeue(&self) -> Option<QueueEvent> {
        let mut inner = self.inner.lock();
        let item = inner.items.pop_front();
        if item.is_some() {
            inner.total_dequeued += 1;
        }
        item
    }

    /// Pops up to `min(n, len)` items, in FIFO order.
    pub fn dequeue_n(&self, n: usize) -> Vec<QueueEvent> {
        let mut inner = self.inner.lock();
        let take = n.min(inner.items.len());
        let drained: Vec<QueueEvent> = inner.items.drain(..take).collect();
        inner.total_dequeued += drained.len() as u64;
        drained
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn stats(&self) -> IngestionQueueStats {
        let inner = self.inner.lock();
        IngestionQueueStats {
            len: inner.items.len(),
            cap: self.cap,
            total_enqueued: inner.total_enqueued,
            total_dequeued: inner.total_dequeued,
            total_dropped: inner.total_dropped,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.items.clear();
        inner.watermark_armed = true;
    }
}

#[cfg(test)]
#[path = "ingestion_queue_tests.rs"]
mod tests;
