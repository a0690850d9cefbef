use super::*;

fn ev(n: u64) -> QueueEvent {
    QueueEvent { event_type: "test".into(), payload: serde_json::json!({ "n": n }), timestamp_ms: n }
}

#[test]
fn fifo_order_preserved() {
    let q = IngestionQueue::new(10);
    q.enqueue(ev(0));
    q.enqueue(ev(1));
    q.enqueue(ev(2));

    assert_eq!(q.dequeue().unwrap().timestamp_ms, 0);
    assert_eq!(q.dequeue().unwrap().timestamp_ms, 1);
    assert_eq!(q.dequeue().unwrap().timestamp_ms, 2);
}

#[test]
fn dequeue_on_empty_returns_none() {
    let q = IngestionQueue::new(4);
    assert!(q.dequeue().is_none());
}

#[test]
fn enqueue_exactly_at_capacity_does_not_drop() {
    let q = IngestionQueue::new(3);
    assert!(!q.enqueue(ev(0)));
    assert!(!q.enqueue(ev(1)));
    assert!(!q.enqueue(ev(2)));
    assert_eq!(q.stats().total_dropped, 0);
    assert_eq!(q.len(), 3);
}

#[test]
fn enqueue_past_capacity_drops_exactly_one_and_keeps_newest() {
    let q = IngestionQueue::new(3);
    for n in 0..3 {
        q.enqueue(ev(n));
    }
    assert!(q.enqueue(ev(3)));
    assert_eq!(q.stats().total_dropped, 1);
    assert_eq!(q.len(), 3);
}

#[test]
fn drop_oldest_policy_matches_capacity_plus_k() {
    let q = IngestionQueue::new(3);
    for n in 0..6u64 {
        q.enqueue(ev(n));
    }
    let drained: Vec<u64> = q.dequeue_n(10).iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(drained, vec![3, 4, 5]);
}

#[test]
fn dequeue_n_returns_at_most_available() {
    let q = IngestionQueue::new(10);
    q.enqueue(ev(0));
    q.enqueue(ev(1));
    let drained = q.dequeue_n(5);
    assert_eq!(drained.len(), 2);
}

#[test]
fn dequeue_n_on_empty_returns_empty() {
    let q = IngestionQueue::new(10);
    assert!(q.dequeue_n(5).is_empty());
}

#[test]
fn queue_conservation_invariant_holds_under_drops() {
    let q = IngestionQueue::new(3);
    for n in 0..10u64 {
        q.enqueue(ev(n));
    }
    let drained = q.dequeue_n(1);
    let stats = q.stats();
    assert_eq!(
        stats.total_enqueued - stats.total_dropped,
        stats.total_dequeued + stats.len as u64
    );
    assert_eq!(drained.len(), 1);
}

#[test]
fn clear_resets_contents_but_not_counters() {
    let q = IngestionQueue::new(3);
    q.enqueue(ev(0));
    q.enqueue(ev(1));
    q.clear();
    assert_eq!(q.len(), 0);
    assert_eq!(q.stats().total_enqueued, 2);
}
