// SPDX-License-Identifier: MIT

use crate::protocol::{Response, PROTOCOL_VERSION};

use super::ListenCtx;

pub(super) async fn handle_get_status(ctx: &ListenCtx) -> Response {
    let stats = ctx.batch_writer.stats();
    Response::Status {
        version: PROTOCOL_VERSION.to_string(),
        active_sessions: ctx.sessions.active_count(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        commands_logged: stats.events_written,
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
