// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use tokio::sync::watch;

/// An optional background task run alongside the idle watcher and cache
/// pruner (e.g. periodic model refresh, export jobs).
#[async_trait]
pub trait MaintenanceRunner: Send + Sync + 'static {
    /// Runs until `shutdown` fires. Implementations should select over
    /// their own ticks and the shutdown signal rather than polling.
    async fn run(&self, shutdown: watch::Receiver<bool>);

    /// Notifies the runner of a noteworthy event (e.g. a completed batch
    /// flush) without waiting for its next tick.
    fn record_event(&self, name: &str);
}
