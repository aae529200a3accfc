//! Tests for worker-driven expiry: delivery at the deadline, stale heap
//! record skipping after TTL refresh, wakeup latency, and shutdown.

mod common;

use common::{counting_callback, noop_callback, recording_callback, test_queue};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn worker_delivers_callback_after_ttl() {
    let queue = test_queue(1000);
    let (callback, seen) = recording_callback();

    queue.enqueue(
        "t0001",
        121,
        "apple".to_string(),
        callback,
        Duration::from_millis(200),
    );
    assert_eq!(queue.pop("t0001", 121).as_deref(), Some("apple"));

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(queue.pop("t0001", 121), None);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[("t0001".to_string(), 121)]
    );
    queue.stop().await;
}

#[tokio::test]
async fn refreshed_ttl_supersedes_the_earlier_deadline() {
    let queue = test_queue(100);
    let (callback, count) = counting_callback();

    queue.enqueue(
        "t0001",
        1,
        "a".to_string(),
        callback.clone(),
        Duration::from_millis(100),
    );
    queue.enqueue("t0001", 1, "a2".to_string(), callback, Duration::from_secs(30));

    // Past the first deadline: the stale record must not fire
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(queue.pop("t0001", 1).as_deref(), Some("a2"));
    queue.stop().await;
}

#[tokio::test]
async fn refreshed_entry_fires_exactly_once_at_the_later_deadline() {
    let queue = test_queue(100);
    let (callback, seen) = recording_callback();

    queue.enqueue(
        "t0001",
        5,
        "short".to_string(),
        callback.clone(),
        Duration::from_millis(100),
    );
    queue.enqueue(
        "t0001",
        5,
        "long".to_string(),
        callback,
        Duration::from_millis(400),
    );

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(seen.lock().unwrap().as_slice(), &[("t0001".to_string(), 5)]);

    // Both heap records drained: the stale one silently, the live one with
    // the delivery above
    assert_eq!(queue.heap_depth("t0001"), 0);
    assert_eq!(queue.len("t0001"), 0);
    queue.stop().await;
}

#[tokio::test]
async fn worker_picks_up_entries_in_a_previously_idle_tenant() {
    let queue = test_queue(100);
    let (callback, count) = counting_callback();

    queue.enqueue(
        "t0001",
        1,
        "first".to_string(),
        callback.clone(),
        Duration::from_millis(50),
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Tenant heap is empty now; the worker is on its idle poll. A fresh
    // enqueue must still expire within a poll interval of its deadline.
    queue.enqueue(
        "t0001",
        2,
        "second".to_string(),
        callback,
        Duration::from_millis(50),
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    queue.stop().await;
}

#[tokio::test]
async fn independent_tenants_expire_independently() {
    let queue = test_queue(100);
    let (callback, seen) = recording_callback();

    queue.enqueue(
        "tA",
        1,
        "a".to_string(),
        callback.clone(),
        Duration::from_millis(100),
    );
    queue.enqueue("tB", 1, "b".to_string(), callback, Duration::from_secs(30));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(seen.lock().unwrap().as_slice(), &[("tA".to_string(), 1)]);
    assert_eq!(queue.pop("tB", 1).as_deref(), Some("b"));
    queue.stop().await;
}

#[tokio::test]
async fn stop_returns_promptly_and_halts_deliveries() {
    let queue = test_queue(100);
    let (callback, count) = counting_callback();

    for tenant in ["tA", "tB", "tC"] {
        for key in 0..4_i64 {
            queue.enqueue(
                tenant,
                key,
                format!("{}-{}", tenant, key),
                callback.clone(),
                Duration::from_secs(10),
            );
        }
    }

    let started = std::time::Instant::now();
    queue.stop().await;
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "stop took {:?}",
        started.elapsed()
    );

    // Workers are gone; the 10s deadlines never deliver
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let queue = test_queue(100);
    queue.enqueue(
        "t0001",
        1,
        "v".to_string(),
        noop_callback(),
        Duration::from_secs(10),
    );
    queue.stop().await;
    queue.stop().await;
    assert!(queue.is_stopped());
}
