// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use clai_core::CommandEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWriterStats {
    pub events_enqueued: u64,
    pub events_written: u64,
    pub events_dropped: u64,
}

/// Asynchronous persister for the V2 suggestions database. The concrete
/// implementation (`clai_daemon::batch_writer`) owns a background task;
/// this trait is the seam handlers and tests depend on.
#[async_trait]
pub trait BatchWriter: Send + Sync + 'static {
    async fn start(&self);
    /// Drains all pending events, persists them, and returns once the
    /// background worker has exited. After this returns,
    /// `events_written + events_dropped == events_enqueued`.
    async fn stop(&self);
    /// Non-blocking, best-effort. May silently drop under backpressure;
    /// that is reflected in `Stats::events_dropped`, never in an error
    /// returned to the RPC caller.
    fn enqueue(&self, event: CommandEvent);
    fn stats(&self) -> BatchWriterStats;
}
