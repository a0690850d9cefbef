// SPDX-License-Identifier: MIT

use clai_collab::SessionRecord;
use clai_core::SessionId;

use crate::protocol::Response;

use super::ListenCtx;

#[allow(clippy::too_many_arguments)]
pub(super) async fn handle_session_start(
    ctx: &ListenCtx,
    session_id: String,
    shell: String,
    os: Option<String>,
    hostname: Option<String>,
    username: Option<String>,
    cwd: String,
) -> Response {
    let now = ctx.now_ms();
    let id = SessionId::from(session_id.clone());
    ctx.sessions.start(id, shell.clone(), cwd.clone(), now);

    let record = SessionRecord {
        session_id,
        shell,
        os: os.unwrap_or_default(),
        hostname: hostname.unwrap_or_default(),
        username: username.unwrap_or_default(),
        cwd,
        started_at_ms: now,
        ended_at_ms: None,
    };
    if let Err(e) = ctx.store.create_session(record).await {
        tracing::warn!(error = %e, "failed to persist session start");
    }
    Response::Ok
}

pub(super) async fn handle_session_end(ctx: &ListenCtx, session_id: String) -> Response {
    let now = ctx.now_ms();
    let id = SessionId::from(session_id.clone());
    ctx.sessions.end(&id);
    ctx.snapshots.evict(&id);

    if let Err(e) = ctx.store.end_session(&session_id, now).await {
        tracing::warn!(error = %e, "failed to persist session end");
    }
    Response::Ok
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
