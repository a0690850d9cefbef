// SPDX-License-Identifier: MIT

use clai_collab::CommandRecord;
use clai_core::session::LastCommand;
use clai_core::{CommandEvent, QueueEvent, SessionId};

use super::{ListenCtx, PendingCommand};
use crate::protocol::Response;

/// `QueueEvent::event_type` for a completed command, queued between
/// `CommandEnded` and the batch writer (spec.md §4.4).
pub(super) const COMMAND_END_EVENT_TYPE: &str = "command_end";

pub(super) async fn handle_command_started(
    ctx: &ListenCtx,
    session_id: String,
    command_id: String,
    raw_text: String,
    cwd: Option<String>,
    repo_key: Option<String>,
    branch: Option<String>,
) -> Response {
    let now = ctx.now_ms();
    let sid = SessionId::from(session_id.clone());
    let cwd = cwd.unwrap_or_else(|| ctx.sessions.get(&sid).map(|s| s.cwd).unwrap_or_default());

    ctx.sessions.update_cwd(&sid, cwd.clone(), now);
    ctx.sessions.stash_command(
        &sid,
        LastCommand {
            command_id: command_id.clone(),
            raw_text: raw_text.clone(),
            cwd: cwd.clone(),
            repo_key: repo_key.clone(),
            branch: branch.clone(),
            timestamp_ms: now,
        },
    );

    ctx.pending_commands.lock().insert(
        command_id.clone(),
        PendingCommand {
            started_at_ms: now,
            raw_text: raw_text.clone(),
            cwd: cwd.clone(),
            repo_key: repo_key.clone(),
            branch: branch.clone(),
        },
    );

    let record = CommandRecord {
        command_id,
        session_id,
        raw_text: raw_text.clone(),
        cmd_norm: clai_core::text::normalize_command(&raw_text),
        cwd,
        repo_key,
        branch,
        started_at_ms: now,
        ended_at_ms: None,
        duration_ms: None,
        exit_code: None,
    };
    if let Err(e) = ctx.store.create_command(record).await {
        tracing::warn!(error = %e, "failed to persist command start");
    }
    Response::Ok
}

pub(super) async fn handle_command_ended(
    ctx: &ListenCtx,
    session_id: String,
    command_id: String,
    exit_code: i32,
) -> Response {
    let now = ctx.now_ms();
    let pending = ctx.pending_commands.lock().remove(&command_id);
    let duration_ms = pending.as_ref().map(|p| now.saturating_sub(p.started_at_ms)).unwrap_or(0);
    let raw_text = pending.as_ref().map(|p| p.raw_text.clone()).unwrap_or_default();

    let sid = SessionId::from(session_id.clone());
    let shell = ctx.sessions.get(&sid).map(|s| s.shell).unwrap_or_default();
    let cwd = pending.as_ref().map(|p| p.cwd.clone()).unwrap_or_default();
    let repo_key = pending.as_ref().and_then(|p| p.repo_key.clone());
    let branch = pending.as_ref().and_then(|p| p.branch.clone());

    // Only activity moves here (spec.md §3); the stash itself was already
    // recorded by the matching `CommandStarted`, before the exit code existed.
    ctx.sessions.touch(&sid, now);

    if let Err(e) = ctx.store.update_command_end(&command_id, now, duration_ms, exit_code).await {
        tracing::warn!(error = %e, "failed to persist command end");
    }

    let event = CommandEvent::new(sid, shell, cwd, raw_text, repo_key, branch, Some(exit_code), Some(duration_ms), now);
    enqueue_event(ctx, event, now);

    Response::Ok
}

/// Pushes `event` onto the bounded ingestion queue (spec.md §4.4) rather
/// than handing it straight to the batch writer; [`drain_queue`] is the
/// only thing that ever reads it back off, gated by the circuit breaker.
fn enqueue_event(ctx: &ListenCtx, event: CommandEvent, now_ms: u64) {
    let payload = match serde_json::to_value(&event) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize command event for the ingestion queue");
            return;
        }
    };
    ctx.queue.enqueue(QueueEvent { event_type: COMMAND_END_EVENT_TYPE.to_string(), payload, timestamp_ms: now_ms });
}

/// Drains every item currently sitting on the ingestion queue, admitting
/// each through the circuit breaker before handing it to the batch writer.
/// Called from the background `queue_drain` task (`lifecycle.rs`); exposed
/// at `pub(crate)` so handler tests can drive it synchronously too.
pub(crate) fn drain_queue(ctx: &ListenCtx) {
    let now = ctx.now_ms();
    while let Some(item) = ctx.queue.dequeue() {
        if !ctx.circuit_breaker.admit(now) {
            continue;
        }
        if item.event_type != COMMAND_END_EVENT_TYPE {
            tracing::warn!(event_type = %item.event_type, "unknown ingestion queue event type, dropping");
            continue;
        }
        match serde_json::from_value::<CommandEvent>(item.payload) {
            Ok(event) => ctx.batch_writer.enqueue(event),
            Err(e) => tracing::warn!(error = %e, "failed to deserialize queued command event, dropping"),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
