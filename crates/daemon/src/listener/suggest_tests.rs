use clai_collab::Suggestion;
use clai_core::SessionId;

use super::super::test_support::harness;
use super::*;

#[tokio::test]
async fn suggest_records_a_snapshot_for_later_feedback_validation() {
    let h = harness();
    h.ranker.set_results(vec![Suggestion { text: "git status".into(), score: 0.9, ..Default::default() }]);

    let resp = handle_suggest(&h.ctx, "s1".into(), "/tmp".into(), "bash".into(), "git".into(), Some("v1".into()), 5).await;
    match resp {
        Response::Suggestions { suggestions } => assert_eq!(suggestions.len(), 1),
        other => panic!("unexpected response: {other:?}"),
    }

    let snapshot = h.ctx.snapshots.get(&SessionId::from("s1"), h.clock.now_ms()).unwrap();
    assert_eq!(snapshot.suggestions[0].command, "git status");
}

#[tokio::test]
async fn suggest_defaults_max_results_to_ten_when_nonpositive() {
    let h = harness();
    let many: Vec<Suggestion> = (0..20).map(|i| Suggestion { text: format!("cmd{i}"), score: 1.0, ..Default::default() }).collect();
    h.ranker.set_results(many);

    let resp = handle_suggest(&h.ctx, "s1".into(), "/tmp".into(), "bash".into(), "".into(), Some("v1".into()), 0).await;
    match resp {
        Response::Suggestions { suggestions } => assert_eq!(suggestions.len(), 10),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn text_to_command_without_provider_returns_explanatory_response_not_error() {
    let h = harness();
    h.provider.set_available(false);
    let resp = handle_text_to_command(&h.ctx, "s1".into(), "list files".into(), "/tmp".into(), "bash".into()).await;
    match resp {
        Response::TextToCommand { command, explanation } => {
            assert_eq!(command, "");
            assert!(!explanation.is_empty());
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn text_to_command_echoes_through_fake_provider() {
    let h = harness();
    let resp = handle_text_to_command(&h.ctx, "s1".into(), "list files".into(), "/tmp".into(), "bash".into()).await;
    match resp {
        Response::TextToCommand { command, .. } => assert_eq!(command, "list files"),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn build_context_pulls_repo_key_and_branch_from_the_last_command_stash() {
    let h = harness();
    h.ctx.sessions.start(SessionId::from("s1"), "bash".into(), "/tmp".into(), 0);
    h.ctx.sessions.stash_command(
        &SessionId::from("s1"),
        clai_core::session::LastCommand {
            command_id: "c1".into(),
            raw_text: "git push".into(),
            cwd: "/repo".into(),
            repo_key: Some("repo-key".into()),
            branch: Some("main".into()),
            timestamp_ms: 10,
        },
    );

    let context = build_context(&h.ctx, "s1", "/repo".into(), "bash".into(), "git".into());
    assert_eq!(context.repo_key.as_deref(), Some("repo-key"));
    assert_eq!(context.branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn diagnose_without_provider_never_errors() {
    let h = harness();
    h.provider.set_available(false);
    let resp = handle_diagnose(&h.ctx, "s1".into(), "ls".into(), "not found".into(), "/tmp".into(), "bash".into()).await;
    assert!(matches!(resp, Response::Diagnose { .. }));
}
