// SPDX-License-Identifier: MIT

use clai_collab::Feedback;
use clai_core::SessionId;

use crate::protocol::{Response, E_INVALID_REQUEST, E_NO_FEEDBACK_STORE, E_STORE_ERROR};

use super::ListenCtx;

/// Shared handler for `RecordFeedback`/`SuggestFeedback` (spec.md §4.7: the
/// two RPC names are aliases over one code path). Skips the learner-update
/// flag, and evicts the session's snapshot, whenever the suggestion being
/// reported on isn't found in a live (non-stale) snapshot.
pub(super) async fn handle_feedback(ctx: &ListenCtx, session_id: String, suggested_text: String, action: String) -> Response {
    if session_id.is_empty() || suggested_text.is_empty() || action.is_empty() {
        return Response::Feedback { ok: false, code: Some(E_INVALID_REQUEST.to_string()) };
    }

    let Some(feedback_store) = ctx.feedback_store.as_ref() else {
        return Response::Feedback { ok: false, code: Some(E_NO_FEEDBACK_STORE.to_string()) };
    };

    let now = ctx.now_ms();
    let sid = SessionId::from(session_id.clone());
    let snapshot = ctx.snapshots.get(&sid, now);
    let learner_updated = snapshot.as_ref().is_some_and(|s| s.suggestions.iter().any(|r| r.command == suggested_text));
    if !learner_updated {
        ctx.snapshots.evict(&sid);
    }

    let feedback = Feedback { session_id, suggested_text, action, timestamp_ms: now };
    match feedback_store.record_feedback(feedback, learner_updated).await {
        Ok(()) => Response::Feedback { ok: true, code: None },
        Err(e) => {
            tracing::warn!(error = %e, "failed to record feedback");
            Response::Feedback { ok: false, code: Some(E_STORE_ERROR.to_string()) }
        }
    }
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
