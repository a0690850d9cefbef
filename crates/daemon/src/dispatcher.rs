// SPDX-License-Identifier: MIT

//! Suggestion dispatcher: selects between the V1 ranker, V2 scorer, and a
//! blended merge of both, then enriches V1-sourced results with risk tags
//! and human-readable reason strings (spec.md §4.6).

use std::sync::Arc;

use clai_collab::{Ranker, Suggestion, SuggestContext, V2Scorer};
use clai_core::risk;

use crate::protocol::SuggestionWire;

pub const VERSION_V1: &str = "v1";
pub const VERSION_V2: &str = "v2";
pub const VERSION_BLEND: &str = "blend";

/// Resolves which version to use for a `Suggest` call, per spec.md §4.6:
/// explicit caller choice wins; otherwise prefer v2 when a V2 scorer is
/// wired in, else fall back to v1; a caller-requested v2/blend without a
/// V2 scorer also falls back to v1.
pub fn resolve_version(requested: Option<&str>, has_v2: bool) -> &'static str {
    let wants = requested.unwrap_or(if has_v2 { VERSION_V2 } else { VERSION_V1 });
    match wants {
        VERSION_V2 | VERSION_BLEND if !has_v2 => {
            tracing::warn!(requested = wants, "no v2 scorer configured, falling back to v1");
            VERSION_V1
        }
        VERSION_V2 => VERSION_V2,
        VERSION_BLEND => VERSION_BLEND,
        _ => VERSION_V1,
    }
}

pub struct Dispatcher {
    ranker: Option<Arc<dyn Ranker>>,
    v2_scorer: Option<Arc<dyn V2Scorer>>,
}

impl Dispatcher {
    pub fn new(ranker: Option<Arc<dyn Ranker>>, v2_scorer: Option<Arc<dyn V2Scorer>>) -> Self {
        Self { ranker, v2_scorer }
    }

    pub fn has_v2(&self) -> bool {
        self.v2_scorer.is_some()
    }

    pub fn v2_scorer(&self) -> Option<Arc<dyn V2Scorer>> {
        self.v2_scorer.clone()
    }

    /// Runs the resolved strategy and returns enriched, wire-ready
    /// suggestions, capped at `max_results`.
    pub async fn dispatch(
        &self,
        context: SuggestContext,
        requested_version: Option<&str>,
        max_results: usize,
    ) -> Vec<SuggestionWire> {
        let version = resolve_version(requested_version, self.has_v2());

        let raw = match version {
            VERSION_V1 => self.run_v1(context).await,
            VERSION_V2 => {
                let v2 = self.run_v2(context.clone()).await;
                if v2.is_empty() {
                    self.run_v1(context).await
                } else {
                    v2
                }
            }
            VERSION_BLEND => {
                let v1 = self.run_v1(context.clone()).await;
                let v2 = self.run_v2(context).await;
                merge(v1, v2, max_results)
            }
            _ => Vec::new(),
        };

        raw.into_iter().take(max_results).map(to_wire).collect()
    }

    async fn run_v1(&self, context: SuggestContext) -> Vec<Suggestion> {
        match &self.ranker {
            Some(ranker) => ranker.rank(context).await.unwrap_or_default().into_iter().map(mark_v1).collect(),
            None => Vec::new(),
        }
    }

    async fn run_v2(&self, context: SuggestContext) -> Vec<Suggestion> {
        match &self.v2_scorer {
            Some(scorer) => scorer.score(context).await.unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

fn mark_v1(mut s: Suggestion) -> Suggestion {
    if s.source.is_empty() {
        s.source = VERSION_V1.to_string();
    }
    s
}

/// `merge(v1, v2, max)`: if one side is empty, return the other capped at
/// `max`. Otherwise interleave V2 first, V1 second, deduplicated by exact
/// command text (first occurrence wins, so V2 wins ties), truncated at
/// `max`.
pub fn merge(v1: Vec<Suggestion>, v2: Vec<Suggestion>, max: usize) -> Vec<Suggestion> {
    if v2.is_empty() {
        return v1.into_iter().take(max).collect();
    }
    if v1.is_empty() {
        return v2.into_iter().take(max).collect();
    }

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(max);
    for s in v2.into_iter().chain(v1) {
        if out.len() >= max {
            break;
        }
        if seen.insert(s.text.clone()) {
            out.push(s);
        }
    }
    out
}

/// Applies V1-only enrichment: risk tag, reason strings, and a "why"
/// description synthesized from those reasons when the scorer didn't
/// already provide a narrative description.
fn to_wire(mut s: Suggestion) -> SuggestionWire {
    if s.cmd_norm.is_none() {
        s.cmd_norm = Some(clai_core::text::normalize_command(&s.text));
    }

    let is_v1 = s.source == VERSION_V1;
    let risk_tag = if is_v1 { risk::classify(&s.text).to_string() } else { s.risk.clone() };

    let mut reasons = Vec::new();
    if is_v1 {
        reasons.push(format!("{}: {:.2}", s.source, s.score));
        if let Some(recency_ms) = s.recency_ms {
            reasons.push(format!("recency: last {} ago", humanize_duration_ms(recency_ms)));
        }
        if let Some(freq) = s.frequency {
            reasons.push(format!("frequency: freq {freq}"));
        }
        let successes = s.success_count.unwrap_or(0);
        let failures = s.failure_count.unwrap_or(0);
        if successes + failures > 0 {
            let pct = (successes as f64 / (successes + failures) as f64) * 100.0;
            reasons.push(format!("success: success {pct:.0}% ({successes}/{})", successes + failures));
        }
    }

    let why = match &s.description {
        Some(desc) if !desc.is_empty() => desc.clone(),
        _ => reasons.join("; "),
    };

    SuggestionWire {
        text: s.text,
        cmd_norm: s.cmd_norm.unwrap_or_default(),
        score: s.score,
        risk: risk_tag,
        reasons,
        why,
    }
}

fn humanize_duration_ms(ms: u64) -> String {
    let secs = ms / 1_000;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
