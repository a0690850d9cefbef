use std::sync::Arc;

use super::*;
use crate::listener::test_support::harness;

#[tokio::test(start_paused = true)]
async fn idle_watcher_fires_shutdown_once_timeout_elapses_with_no_sessions() {
    let h = harness();
    let ctx = Arc::new(h.ctx);

    let watcher = tokio::spawn(idle_watcher(Arc::clone(&ctx), 1_000));
    let mut shutdown_rx = ctx.shutdown.subscribe();

    tokio::time::advance(Duration::from_secs(6)).await;
    shutdown_rx.changed().await.unwrap();
    assert!(*shutdown_rx.borrow());

    watcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn idle_watcher_does_not_fire_while_a_session_is_active() {
    let h = harness();
    h.ctx.sessions.start(clai_core::SessionId::from("s1"), "bash".into(), "/tmp".into(), h.clock.now_ms());
    let ctx = Arc::new(h.ctx);

    let watcher = tokio::spawn(idle_watcher(Arc::clone(&ctx), 1_000));
    tokio::time::advance(Duration::from_secs(6)).await;

    assert!(!*ctx.shutdown.subscribe().borrow());
    let _ = ctx.shutdown.send(true);
    watcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn queue_drain_forwards_admitted_events_to_the_batch_writer() {
    let h = harness();
    let batch_writer = Arc::clone(&h.batch_writer);
    let ctx = Arc::new(h.ctx);

    ctx.queue.enqueue(clai_core::QueueEvent {
        event_type: "command_end".into(),
        payload: serde_json::to_value(clai_core::CommandEvent::new(
            clai_core::SessionId::from("s1"),
            "bash".into(),
            "/tmp".into(),
            "ls".into(),
            None,
            None,
            Some(0),
            Some(10),
            1_000,
        ))
        .unwrap(),
        timestamp_ms: 1_000,
    });

    let drain = tokio::spawn(queue_drain(Arc::clone(&ctx), Duration::from_millis(10)));
    tokio::time::advance(Duration::from_millis(20)).await;

    assert_eq!(batch_writer.events().len(), 1);

    let _ = ctx.shutdown.send(true);
    drain.await.unwrap();
}

#[tokio::test]
async fn cleanup_on_failure_removes_the_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_runtime_dir(dir.path().to_path_buf());
    std::fs::write(&config.socket_path, b"not a real socket").unwrap();

    cleanup_on_failure(&config);

    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn shutdown_is_idempotent_and_removes_the_socket() {
    let h = harness();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_runtime_dir(dir.path().to_path_buf());
    std::fs::write(&config.socket_path, b"socket").unwrap();

    let mut lock = LockGuard::acquire(&config.lock_path).unwrap();
    shutdown(&h.ctx, &config, &mut lock).await;
    assert!(!config.socket_path.exists());

    // second call must not panic
    shutdown(&h.ctx, &config, &mut lock).await;
}
