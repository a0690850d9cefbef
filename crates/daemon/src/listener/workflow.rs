// SPDX-License-Identifier: MIT

use clai_collab::WorkflowRecord;

use crate::protocol::Response;

use super::ListenCtx;

/// Normalizes a raw decision string from the LLM's analysis response per
/// spec.md §4.7: `approve|proceed → proceed`, `reject|halt → halt`,
/// `needs_human → needs_human`, `error → error`; anything else also falls
/// back to `needs_human` (lenient parsing, never an unrecognized decision).
fn normalize_decision(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "approve" | "proceed" => "proceed",
        "reject" | "halt" => "halt",
        "error" => "error",
        _ => "needs_human",
    }
}

pub(super) async fn handle_run_start(ctx: &ListenCtx, run_id: String, name: String) -> Response {
    let record = WorkflowRecord { run_id: run_id.clone(), name, status: "running".into(), started_at_ms: ctx.now_ms(), ended_at_ms: None };
    if let Err(e) = ctx.store.upsert_workflow(record).await {
        tracing::debug!(error = %e, "workflow tracking not supported by this store");
    }
    Response::Workflow { run_id, status: "running".into() }
}

pub(super) async fn handle_step_update(ctx: &ListenCtx, run_id: String, step: String, status: String) -> Response {
    tracing::info!(run_id, step, status, "workflow step update");
    if let Ok(mut record) = ctx.store.get_workflow(&run_id).await {
        record.status = format!("{step}:{status}");
        if let Err(e) = ctx.store.upsert_workflow(record).await {
            tracing::debug!(error = %e, "workflow tracking not supported by this store");
        }
    }
    Response::Workflow { run_id, status }
}

pub(super) async fn handle_run_end(ctx: &ListenCtx, run_id: String, status: String) -> Response {
    if let Ok(mut record) = ctx.store.get_workflow(&run_id).await {
        record.status = status.clone();
        record.ended_at_ms = Some(ctx.now_ms());
        if let Err(e) = ctx.store.upsert_workflow(record).await {
            tracing::debug!(error = %e, "workflow tracking not supported by this store");
        }
    }
    Response::Workflow { run_id, status }
}

/// Analyzes a step's output under a 120s deadline (spec.md §5), falling
/// back to `needs_human` with the raw provider text as reasoning on
/// timeout, provider failure, or an absent provider.
pub(super) async fn handle_analyze_step_output(ctx: &ListenCtx, run_id: String, step: String, output: String) -> Response {
    const ANALYSIS_DEADLINE: std::time::Duration = std::time::Duration::from_secs(120);

    let context = clai_collab::SuggestContext {
        session_id: run_id,
        cwd: String::new(),
        shell: String::new(),
        repo_key: None,
        branch: None,
        prefix: step,
        max_results: 0,
    };

    let Some(provider) = ctx.provider.as_ref() else {
        return Response::AnalyzeStepOutput { decision: "needs_human".into(), reasoning: "no AI provider configured".into() };
    };

    let call = provider.diagnose(&context.prefix, &output, &context);
    match tokio::time::timeout(ANALYSIS_DEADLINE, call).await {
        Ok(Ok(result)) => {
            let decision = extract_decision(&result.explanation);
            Response::AnalyzeStepOutput { decision: normalize_decision(&decision).to_string(), reasoning: result.explanation }
        }
        Ok(Err(e)) => Response::AnalyzeStepOutput { decision: "needs_human".into(), reasoning: format!("provider error: {e}") },
        Err(_) => Response::AnalyzeStepOutput { decision: "needs_human".into(), reasoning: "analysis timed out".into() },
    }
}

/// Leniently pulls a decision keyword out of a provider response: strict
/// JSON `{"decision": "..."}`, then a bare keyword anywhere in the prose,
/// then gives up (the caller normalizes an empty string to `needs_human`).
fn extract_decision(text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(decision) = value.get("decision").and_then(|v| v.as_str()) {
            return decision.to_string();
        }
    }
    for candidate in ["approve", "proceed", "reject", "halt", "needs_human", "error"] {
        if text.to_ascii_lowercase().contains(candidate) {
            return candidate.to_string();
        }
    }
    String::new()
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
