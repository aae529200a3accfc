//! Per-item record and expiry scheduling types.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Notification invoked when an entry leaves its tenant involuntarily:
/// deadline expiry, or eviction of the oldest entry from a full tenant.
/// Receives the tenant id and the entry key.
///
/// Callbacks always run after the tenant lock has been released, on the
/// expiry worker task (worker-driven expiry) or the calling task (eviction
/// and lazy expiry observed by `pop`/`dequeue`).
pub type ExpiryCallback = Arc<dyn Fn(&str, i64) + Send + Sync>;

/// A single keyed item owned by one tenant.
///
/// `prev`/`next` thread the entry into its tenant's insertion-order list;
/// they are maintained exclusively by the ordered store.
pub(crate) struct Entry<V> {
    pub value: V,
    /// Monotonic deadline used for expiry checks and worker scheduling.
    pub deadline: Instant,
    /// Wall-clock twin of `deadline`, captured at enqueue for inspection.
    pub expires_at: SystemTime,
    pub prev: Option<i64>,
    pub next: Option<i64>,
    pub on_expire: ExpiryCallback,
}

/// Immutable `(deadline, key)` expiry record.
///
/// A record is pushed on every enqueue, including overwrites, and never
/// mutated afterwards. A record superseded by a later enqueue of the same
/// key is skipped when it reaches the top of the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeapRecord {
    pub deadline: Instant,
    pub key: i64,
}

impl Ord for HeapRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse ordering for min-heap (earliest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for HeapRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A callback staged under the store lock, to be fired by the caller after
/// the lock is released.
pub(crate) struct StagedNotify {
    pub callback: ExpiryCallback,
    pub key: i64,
}

/// Read-only copy of a live entry, taken under the store lock.
#[derive(Debug, Clone)]
pub struct EntrySnapshot<V> {
    pub key: i64,
    pub value: V,
    pub deadline: Instant,
    pub expires_at: SystemTime,
}
