//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

use smartqueue::core::config::QueueConfig;
use smartqueue::{ExpiryCallback, SmartQueue};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Fast worker poll so expiry tests settle quickly.
pub const TEST_POLL_MS: u64 = 25;

/// Create a queue with the given per-tenant capacity and a fast worker poll.
pub fn test_queue(capacity: usize) -> SmartQueue<String> {
    SmartQueue::new(QueueConfig {
        capacity,
        poll_interval_ms: TEST_POLL_MS,
    })
    .expect("queue config should be valid")
}

/// A callback that counts its invocations.
pub fn counting_callback() -> (ExpiryCallback, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let observed = count.clone();
    let callback: ExpiryCallback = Arc::new(move |_tenant, _key| {
        observed.fetch_add(1, Ordering::SeqCst);
    });
    (callback, count)
}

/// A callback that records every (tenant, key) pair it sees.
pub fn recording_callback() -> (ExpiryCallback, Arc<Mutex<Vec<(String, i64)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observed = seen.clone();
    let callback: ExpiryCallback = Arc::new(move |tenant, key| {
        observed
            .lock()
            .expect("recording lock poisoned")
            .push((tenant.to_string(), key));
    });
    (callback, seen)
}

/// A callback that does nothing.
pub fn noop_callback() -> ExpiryCallback {
    Arc::new(|_, _| {})
}

/// Write a config file with the given content.
pub fn create_config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_test_queue() {
        let queue = test_queue(3);
        let fired = queue.enqueue("t1", 1, "v".to_string(), noop_callback(), Duration::from_secs(5));
        assert!(!fired);
        assert_eq!(queue.len("t1"), 1);
        queue.stop().await;
    }

    #[test]
    fn test_counting_callback() {
        let (callback, count) = counting_callback();
        callback("t1", 1);
        callback("t1", 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recording_callback() {
        let (callback, seen) = recording_callback();
        callback("t1", 7);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("t1".to_string(), 7)]);
    }
}
