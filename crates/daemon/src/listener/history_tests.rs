use clai_collab::CommandRecord;

use super::super::test_support::harness;
use super::*;

async fn seed_command(store: &clai_collab::FakeStore, id: &str, session_id: &str, raw_text: &str, started_at_ms: u64) {
    store
        .create_command(CommandRecord {
            command_id: id.into(),
            session_id: session_id.into(),
            raw_text: raw_text.into(),
            cmd_norm: clai_core::text::normalize_command(raw_text),
            cwd: "/tmp".into(),
            repo_key: None,
            branch: None,
            started_at_ms,
            ended_at_ms: None,
            duration_ms: None,
            exit_code: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn fetch_history_dedups_by_exact_raw_text() {
    let h = harness();
    seed_command(&h.store, "c1", "s1", "git status", 1).await;
    seed_command(&h.store, "c2", "s1", "git status", 2).await;
    seed_command(&h.store, "c3", "s1", "git log", 3).await;

    let resp = handle_fetch_history(&h.ctx, Some("s1".into()), false, None, 50, 0, None).await;
    match resp {
        Response::History { commands, .. } => assert_eq!(commands.len(), 2),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_history_defaults_limit_and_clamps_negative_offset() {
    let h = harness();
    for i in 0..5 {
        seed_command(&h.store, &format!("c{i}"), "s1", &format!("cmd{i}"), i as u64).await;
    }
    let resp = handle_fetch_history(&h.ctx, Some("s1".into()), false, None, 0, -5, None).await;
    match resp {
        Response::History { commands, at_end, .. } => {
            assert_eq!(commands.len(), 5);
            assert!(at_end);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_history_at_end_false_when_more_rows_remain() {
    let h = harness();
    for i in 0..5 {
        seed_command(&h.store, &format!("c{i}"), "s1", &format!("cmd{i}"), i as u64).await;
    }
    let resp = handle_fetch_history(&h.ctx, Some("s1".into()), false, None, 2, 0, None).await;
    match resp {
        Response::History { commands, at_end, .. } => {
            assert_eq!(commands.len(), 2);
            assert!(!at_end);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_history_fts_mode_prefers_the_v2_scorer() {
    let h = harness();
    seed_command(&h.store, "c1", "s1", "git status", 1).await;
    h.v2_scorer.set_history_result(clai_collab::HistoryResult {
        commands: vec![CommandRecord {
            command_id: "v2-1".into(),
            session_id: "s1".into(),
            raw_text: "git push".into(),
            cmd_norm: "git push".into(),
            cwd: "/tmp".into(),
            repo_key: None,
            branch: None,
            started_at_ms: 5,
            ended_at_ms: None,
            duration_ms: None,
            exit_code: None,
        }],
        at_end: true,
        backend: "v2".into(),
    });

    let resp = handle_fetch_history(&h.ctx, Some("s1".into()), false, None, 50, 0, Some("fts".into())).await;
    match resp {
        Response::History { commands, backend, .. } => {
            assert_eq!(backend, "v2");
            assert_eq!(commands.len(), 1);
            assert_eq!(commands[0].raw_text, "git push");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_history_fts_mode_falls_back_to_storage_on_v2_error() {
    let h = harness();
    seed_command(&h.store, "c1", "s1", "git status", 1).await;
    h.v2_scorer.set_history_failing(true);

    let resp = handle_fetch_history(&h.ctx, Some("s1".into()), false, None, 50, 0, Some("fts".into())).await;
    match resp {
        Response::History { commands, backend, .. } => {
            assert_eq!(backend, "storage");
            assert_eq!(commands.len(), 1);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn import_history_short_circuits_when_already_imported() {
    let h = harness();
    h.store.seed_history("bash", "s1", vec!["ls".into()]);
    let resp = handle_import_history(&h.ctx, "s1".into(), "bash".into(), true).await;
    assert_eq!(resp, Response::ImportHistory { imported: 0, skipped: true });
}
