use super::super::test_support::harness;
use super::*;

#[tokio::test]
async fn command_started_then_ended_computes_duration_and_enqueues_event() {
    let h = harness();
    handle_session_start(&h.ctx, "s1".into(), "bash".into(), None, None, None, "/tmp".into()).await;

    h.clock.set(1_000);
    handle_command_started(&h.ctx, "s1".into(), "c1".into(), "git status".into(), None, None, None).await;

    h.clock.set(1_500);
    let resp = handle_command_ended(&h.ctx, "s1".into(), "c1".into(), 0).await;
    assert_eq!(resp, Response::Ok);

    let persisted = h.store.command("c1").unwrap();
    assert_eq!(persisted.duration_ms, Some(500));
    assert_eq!(persisted.exit_code, Some(0));

    assert_eq!(h.ctx.queue.stats().total_enqueued, 1);
    drain_queue(&h.ctx);

    let events = h.batch_writer.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].raw_text, "git status");
    assert_eq!(events[0].duration_ms, Some(500));
}

#[tokio::test]
async fn command_ended_without_prior_start_tolerates_missing_stash() {
    let h = harness();
    handle_session_start(&h.ctx, "s1".into(), "bash".into(), None, None, None, "/tmp".into()).await;

    let resp = handle_command_ended(&h.ctx, "s1".into(), "orphan".into(), 1).await;
    assert_eq!(resp, Response::Ok);

    drain_queue(&h.ctx);
    let events = h.batch_writer.events();
    assert_eq!(events[0].duration_ms, Some(0));
    assert_eq!(events[0].raw_text, "");
}

#[tokio::test]
async fn command_started_stashes_last_command_and_updates_cwd() {
    let h = harness();
    handle_session_start(&h.ctx, "s1".into(), "bash".into(), None, None, None, "/tmp".into()).await;

    h.clock.set(2_000);
    handle_command_started(
        &h.ctx,
        "s1".into(),
        "c1".into(),
        "git push".into(),
        Some("/repo".into()),
        Some("repo-key".into()),
        Some("main".into()),
    )
    .await;

    let info = h.ctx.sessions.get(&clai_core::SessionId::from("s1")).unwrap();
    assert_eq!(info.cwd, "/repo");
    let stashed = info.last_command.expect("command stashed at start, before the exit code exists");
    assert_eq!(stashed.command_id, "c1");
    assert_eq!(stashed.raw_text, "git push");
    assert_eq!(stashed.repo_key.as_deref(), Some("repo-key"));
    assert_eq!(stashed.branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn circuit_breaker_rejection_drops_the_queued_event_without_reaching_the_batch_writer() {
    let h = harness();
    handle_session_start(&h.ctx, "s1".into(), "bash".into(), None, None, None, "/tmp".into()).await;

    // Trip the breaker directly, bypassing the command flow, then confirm a
    // drained event that lands while it's open never reaches the writer.
    let cfg = h.ctx.circuit_breaker.config();
    for t in 1_000..=1_000 + cfg.burst_threshold as u64 {
        h.ctx.circuit_breaker.admit(t);
    }
    assert_eq!(h.ctx.circuit_breaker.state(), clai_core::CircuitState::Open);

    handle_command_ended(&h.ctx, "s1".into(), "c1".into(), 0).await;
    drain_queue(&h.ctx);

    assert!(h.batch_writer.events().is_empty());
    assert_eq!(h.ctx.queue.stats().total_dequeued, 1);
}
