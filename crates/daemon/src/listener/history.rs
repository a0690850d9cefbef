// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use clai_collab::HistoryQuery;

use crate::protocol::{HistoryCommandWire, Response};

use super::ListenCtx;

const DEFAULT_LIMIT: usize = 50;

const FTS_MODE: &str = "fts";

/// `FetchHistory`: normalizes limit/offset, strips ANSI and dedups by exact
/// raw text (spec.md §4.7). End-of-results detection is the store's job
/// (it overfetches by one row internally); this handler trusts `at_end`.
/// `mode: Some("fts")` tries the V2 scorer's full-text search first,
/// falling back to the storage-backed query (forcing `backend="storage"`)
/// on a V2 error.
pub(super) async fn handle_fetch_history(
    ctx: &ListenCtx,
    session_id: Option<String>,
    global: bool,
    filter: Option<String>,
    limit: i64,
    offset: i64,
    mode: Option<String>,
) -> Response {
    let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit as usize };
    let offset = if offset < 0 { 0 } else { offset as usize };

    let query = HistoryQuery {
        session_id: session_id.clone(),
        filter_substring: filter.map(|f| clai_core::text::strip_ansi(&f)),
        global,
        limit,
        offset,
        mode: mode.clone(),
    };

    let wants_fts = mode.as_deref().map(|m| m.eq_ignore_ascii_case(FTS_MODE)).unwrap_or(false);
    let result = match (wants_fts, ctx.dispatcher.v2_scorer()) {
        (true, Some(v2_scorer)) => match v2_scorer.search_history(query.clone()).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(error = %e, "v2 fts history search failed, falling back to storage");
                ctx.store.query_history_commands(query).await.map(|mut r| {
                    r.backend = "storage".into();
                    r
                })
            }
        },
        _ => ctx.store.query_history_commands(query).await,
    };

    // The store itself overfetches by one row to determine `at_end`
    // (spec.md §4.7); the handler trusts that flag and only dedups on top.
    match result {
        Ok(result) => {
            let at_end = result.at_end;

            let mut seen = HashSet::new();
            let mut commands: Vec<HistoryCommandWire> = Vec::with_capacity(result.commands.len());
            for cmd in result.commands {
                let cleaned = clai_core::text::strip_ansi(&cmd.raw_text);
                if !seen.insert(cleaned.clone()) {
                    continue;
                }
                commands.push(HistoryCommandWire {
                    raw_text: cleaned,
                    cwd: cmd.cwd,
                    started_at_ms: cmd.started_at_ms,
                    exit_code: cmd.exit_code,
                });
                if commands.len() == limit {
                    break;
                }
            }
            Response::History { commands, at_end, backend: result.backend }
        }
        Err(e) => {
            tracing::warn!(error = %e, "history query failed");
            Response::History { commands: Vec::new(), at_end: true, backend: "storage".into() }
        }
    }
}

pub(super) async fn handle_import_history(ctx: &ListenCtx, session_id: String, shell: String, if_not_exists: bool) -> Response {
    if if_not_exists {
        match ctx.store.has_imported_history(&session_id, &shell).await {
            Ok(true) => return Response::ImportHistory { imported: 0, skipped: true },
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "has_imported_history check failed");
                return Response::ImportHistory { imported: 0, skipped: true };
            }
        }
    }

    let entries = match crate::shell_history::read_shell_history(&shell) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, shell, "failed to read shell history for import");
            return Response::ImportHistory { imported: 0, skipped: false };
        }
    };

    match ctx.store.import_history(&session_id, &shell, entries.clone()).await {
        Ok(imported) => {
            backfill_v2(ctx, &session_id, &shell, &entries);
            Response::ImportHistory { imported, skipped: false }
        }
        Err(e) => {
            tracing::warn!(error = %e, "import_history failed");
            Response::ImportHistory { imported: 0, skipped: false }
        }
    }
}

/// Best-effort seed of the V2 suggestions store: log but never fail the
/// RPC on a V2-side problem (spec.md §4.7).
fn backfill_v2(ctx: &ListenCtx, session_id: &str, shell: &str, entries: &[String]) {
    let sid = clai_core::SessionId::from(session_id.to_string());
    let now = ctx.now_ms();
    for raw_text in entries {
        ctx.batch_writer.enqueue(clai_core::CommandEvent::new(
            sid.clone(),
            shell.to_string(),
            String::new(),
            raw_text.clone(),
            None,
            None,
            None,
            None,
            now,
        ));
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
