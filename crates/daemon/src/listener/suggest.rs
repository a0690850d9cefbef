// SPDX-License-Identifier: MIT

use clai_collab::SuggestContext;
use clai_core::snapshot::{RankedSuggestion, SuggestSnapshot};
use clai_core::SessionId;

use crate::protocol::Response;

use super::ListenCtx;

/// Repo key and branch aren't part of the `Suggest`/`NextStep`/`Diagnose`
/// RPC shapes; they come from the session's last-command stash, set by the
/// most recent `CommandStarted` (spec.md §3).
fn build_context(ctx: &ListenCtx, session_id: &str, cwd: String, shell: String, prefix: String) -> SuggestContext {
    let sid = SessionId::from(session_id.to_string());
    let last_command = ctx.sessions.get(&sid).and_then(|s| s.last_command);
    let repo_key = last_command.as_ref().and_then(|c| c.repo_key.clone());
    let branch = last_command.and_then(|c| c.branch);
    SuggestContext { session_id: session_id.to_string(), cwd, shell, repo_key, branch, prefix, max_results: 10 }
}

pub(super) async fn handle_suggest(
    ctx: &ListenCtx,
    session_id: String,
    cwd: String,
    shell: String,
    prefix: String,
    version: Option<String>,
    max_results: i64,
) -> Response {
    let max_results = if max_results <= 0 { 10 } else { max_results as usize };
    let context = build_context(ctx, &session_id, cwd, shell, prefix);

    let suggestions = ctx.dispatcher.dispatch(context.clone(), version.as_deref(), max_results).await;

    if !suggestions.is_empty() {
        let ranked = suggestions
            .iter()
            .map(|s| RankedSuggestion { command: s.text.clone(), template_id: String::new(), score: s.score })
            .collect();
        let sid = SessionId::from(session_id);
        ctx.snapshots.record(
            sid,
            SuggestSnapshot { context: context.prefix.clone(), suggestions: ranked, shown_at_ms: ctx.now_ms() },
        );
    }

    Response::Suggestions { suggestions }
}

pub(super) async fn handle_text_to_command(ctx: &ListenCtx, session_id: String, prompt: String, cwd: String, shell: String) -> Response {
    let context = build_context(ctx, &session_id, cwd, shell, String::new());
    match &ctx.provider {
        Some(provider) if provider.available().await => match provider.text_to_command(&prompt, &context).await {
            Ok(result) => Response::TextToCommand { command: result.command, explanation: result.explanation },
            Err(e) => {
                tracing::warn!(error = %e, "text-to-command provider call failed");
                Response::TextToCommand { command: String::new(), explanation: "no suggestion available".into() }
            }
        },
        _ => Response::TextToCommand { command: String::new(), explanation: "no AI provider configured".into() },
    }
}

pub(super) async fn handle_next_step(ctx: &ListenCtx, session_id: String, cwd: String, shell: String) -> Response {
    let context = build_context(ctx, &session_id, cwd, shell, String::new());
    match &ctx.provider {
        Some(provider) if provider.available().await => match provider.next_step(&context).await {
            Ok(result) => Response::NextStep { commands: result.commands, explanation: result.explanation },
            Err(e) => {
                tracing::warn!(error = %e, "next-step provider call failed");
                Response::NextStep { commands: Vec::new(), explanation: "no suggestion available".into() }
            }
        },
        _ => Response::NextStep { commands: Vec::new(), explanation: "no AI provider configured".into() },
    }
}

pub(super) async fn handle_diagnose(
    ctx: &ListenCtx,
    session_id: String,
    command: String,
    output: String,
    cwd: String,
    shell: String,
) -> Response {
    let context = build_context(ctx, &session_id, cwd, shell, String::new());
    match &ctx.provider {
        Some(provider) if provider.available().await => match provider.diagnose(&command, &output, &context).await {
            Ok(result) => Response::Diagnose { explanation: result.explanation },
            Err(e) => {
                tracing::warn!(error = %e, "diagnose provider call failed");
                Response::Diagnose { explanation: "unable to diagnose this failure".into() }
            }
        },
        _ => Response::Diagnose { explanation: "no AI provider configured".into() },
    }
}

#[cfg(test)]
#[path = "suggest_tests.rs"]
mod tests;
