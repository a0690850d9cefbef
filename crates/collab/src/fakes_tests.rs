use super::*;

fn session(id: &str) -> SessionRecord {
    SessionRecord {
        session_id: id.to_string(),
        shell: "bash".into(),
        os: "linux".into(),
        hostname: "host".into(),
        username: "user".into(),
        cwd: "/".into(),
        started_at_ms: 0,
        ended_at_ms: None,
    }
}

fn command(id: &str, session_id: &str, raw_text: &str, started_at_ms: u64) -> CommandRecord {
    CommandRecord {
        command_id: id.to_string(),
        session_id: session_id.to_string(),
        raw_text: raw_text.to_string(),
        cmd_norm: raw_text.to_string(),
        cwd: "/".into(),
        repo_key: None,
        branch: None,
        started_at_ms,
        ended_at_ms: None,
        duration_ms: None,
        exit_code: None,
    }
}

#[tokio::test]
async fn fake_store_records_session_lifecycle_calls() {
    let store = FakeStore::new();
    store.create_session(session("s1")).await.unwrap();
    store.end_session("s1", 100).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::CreateSession("s1".into()), StoreCall::EndSession("s1".into())]
    );
}

#[tokio::test]
async fn fake_store_dedupes_by_command_id_not_raw_text() {
    let store = FakeStore::new();
    store.create_command(command("c1", "s1", "cd /a", 1000)).await.unwrap();
    store.create_command(command("c2", "s1", "cd /b", 2000)).await.unwrap();

    let result = store
        .query_history_commands(HistoryQuery {
            session_id: None,
            filter_substring: None,
            global: true,
            limit: 50,
            offset: 0,
            mode: None,
        })
        .await
        .unwrap();

    assert_eq!(result.commands.len(), 2);
    assert!(result.at_end);
}

#[tokio::test]
async fn fake_ranker_returns_programmed_results() {
    let ranker = FakeRanker::new(vec![Suggestion { text: "ls".into(), ..Default::default() }]);
    let results = ranker
        .rank(SuggestContext {
            session_id: "s1".into(),
            cwd: "/".into(),
            shell: "bash".into(),
            repo_key: None,
            branch: None,
            prefix: "l".into(),
            max_results: 5,
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "ls");
}

#[tokio::test]
async fn fake_provider_reports_unavailable() {
    let provider = FakeProvider::new("fake");
    provider.set_available(false);
    let ctx = SuggestContext {
        session_id: "s1".into(),
        cwd: "/".into(),
        shell: "bash".into(),
        repo_key: None,
        branch: None,
        prefix: "".into(),
        max_results: 5,
    };
    assert!(provider.text_to_command("do a thing", &ctx).await.is_err());
}

#[tokio::test]
async fn fake_feedback_store_filters_by_session() {
    let store = FakeFeedbackStore::new();
    store
        .record_feedback(
            Feedback { session_id: "s1".into(), suggested_text: "ls".into(), action: "accept".into(), timestamp_ms: 0 },
            true,
        )
        .await
        .unwrap();
    store
        .record_feedback(
            Feedback { session_id: "s2".into(), suggested_text: "pwd".into(), action: "reject".into(), timestamp_ms: 0 },
            false,
        )
        .await
        .unwrap();

    let results = store.query_feedback("s1").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].feedback.suggested_text, "ls");
}
