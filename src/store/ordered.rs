//! The per-tenant ordered store.
//!
//! Couples three views of the same entries behind one mutex:
//! - `by_key` - direct key access
//! - an insertion-order list threaded through the entries (`head`/`tail`
//!   plus per-entry neighbor keys), giving O(1) push-back, front access,
//!   and arbitrary removal
//! - `heap` - a min-heap of `(deadline, key)` records driving expiry
//!
//! Heap records are never mutated. An overwrite refreshes the entry's
//! deadline and pushes a fresh record; the superseded record is skipped
//! when it surfaces at the top of the heap. Records therefore outnumber
//! live entries until the stale ones drain.
//!
//! `size` lives outside the mutex as an atomic so diagnostics can read it
//! lock-free; it is only mutated while the mutex is held.

use crate::store::entry::{Entry, EntrySnapshot, ExpiryCallback, HeapRecord, StagedNotify};
use parking_lot::Mutex;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime};

/// Outcome of admitting an entry.
pub(crate) struct Admission {
    /// True when the tenant was full and the oldest entry was evicted.
    pub capacity_reached: bool,
    /// The evicted entry's staged notification, if any.
    pub evicted: Option<StagedNotify>,
}

/// Outcome of a key lookup.
pub(crate) enum LookupOutcome<V> {
    /// Entry is live; the value is a copy.
    Live(V),
    /// Entry was past its deadline and has been removed.
    Expired(StagedNotify),
    /// Key not present.
    Missing,
}

/// Outcome of taking the front of the insertion order.
pub(crate) enum TakeFrontOutcome<V> {
    /// Front entry was live and has been removed.
    Taken(i64, V),
    /// Front entry was past its deadline and has been removed.
    ExpiredFront(StagedNotify),
    /// Tenant holds no entries.
    Empty,
}

/// The per-tenant store: key index, insertion-order list, expiry heap.
pub struct OrderedStore<V> {
    inner: Mutex<StoreInner<V>>,
    size: AtomicUsize,
    capacity: usize,
}

struct StoreInner<V> {
    by_key: HashMap<i64, Entry<V>>,
    head: Option<i64>,
    tail: Option<i64>,
    heap: BinaryHeap<HeapRecord>,
}

impl<V> OrderedStore<V> {
    /// Create an empty store with the given capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                by_key: HashMap::new(),
                head: None,
                tail: None,
                heap: BinaryHeap::new(),
            }),
            size: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Number of live entries. Lock-free.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Whether the store holds no live entries. Lock-free.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed per-tenant capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of heap records, live and stale.
    pub fn heap_depth(&self) -> usize {
        self.inner.lock().heap.len()
    }

    /// Whether the key is currently live.
    pub fn contains(&self, key: i64) -> bool {
        self.inner.lock().by_key.contains_key(&key)
    }

    /// Insert or overwrite an entry.
    ///
    /// Overwrite refreshes value and deadline but keeps the entry's
    /// position and callback, and never counts against capacity. A new key
    /// admitted into a full store evicts the oldest entry; the eviction
    /// notification is staged for the caller to fire outside the lock.
    pub(crate) fn admit(
        &self,
        key: i64,
        value: V,
        on_expire: ExpiryCallback,
        ttl: Duration,
    ) -> Admission {
        let deadline = Instant::now() + ttl;
        let expires_at = SystemTime::now() + ttl;

        let mut inner = self.inner.lock();
        let mut admission = Admission {
            capacity_reached: false,
            evicted: None,
        };

        if let Some(entry) = inner.by_key.get_mut(&key) {
            entry.value = value;
            entry.deadline = deadline;
            entry.expires_at = expires_at;
        } else {
            if self.size.load(Ordering::Relaxed) >= self.capacity {
                if let Some(front) = inner.head {
                    if let Some(evicted) = inner.unlink(front) {
                        self.size.fetch_sub(1, Ordering::Relaxed);
                        admission.evicted = Some(StagedNotify {
                            callback: evicted.on_expire,
                            key: front,
                        });
                    }
                }
                admission.capacity_reached = true;
            }
            inner.push_back(
                key,
                Entry {
                    value,
                    deadline,
                    expires_at,
                    prev: None,
                    next: None,
                    on_expire,
                },
            );
            self.size.fetch_add(1, Ordering::Relaxed);
        }

        inner.heap.push(HeapRecord { deadline, key });
        admission
    }

    /// Look up a key, lazily expiring it when past its deadline.
    ///
    /// A live hit does NOT remove the entry.
    pub(crate) fn lookup(&self, key: i64) -> LookupOutcome<V>
    where
        V: Clone,
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        match inner.by_key.get(&key) {
            None => return LookupOutcome::Missing,
            Some(entry) if now < entry.deadline => {
                return LookupOutcome::Live(entry.value.clone())
            }
            Some(_) => {}
        }

        // Past the deadline: remove and stage the notification. The entry's
        // heap records stay behind and drain as stale.
        match inner.unlink(key) {
            Some(entry) => {
                self.size.fetch_sub(1, Ordering::Relaxed);
                LookupOutcome::Expired(StagedNotify {
                    callback: entry.on_expire,
                    key,
                })
            }
            None => LookupOutcome::Missing,
        }
    }

    /// Remove and return the oldest entry.
    ///
    /// An expired front entry is removed with its notification staged;
    /// one call consumes at most one front item.
    pub(crate) fn take_front(&self) -> TakeFrontOutcome<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let Some(front) = inner.head else {
            return TakeFrontOutcome::Empty;
        };
        let expired = match inner.by_key.get(&front) {
            Some(entry) => now >= entry.deadline,
            None => return TakeFrontOutcome::Empty,
        };
        let Some(entry) = inner.unlink(front) else {
            return TakeFrontOutcome::Empty;
        };
        self.size.fetch_sub(1, Ordering::Relaxed);

        if expired {
            TakeFrontOutcome::ExpiredFront(StagedNotify {
                callback: entry.on_expire,
                key: front,
            })
        } else {
            TakeFrontOutcome::Taken(front, entry.value)
        }
    }

    /// Silently remove a key. Never stages a notification.
    pub(crate) fn discard(&self, key: i64) -> bool {
        let mut inner = self.inner.lock();
        if inner.unlink(key).is_some() {
            self.size.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Earliest live deadline, discarding stale records at the top of the
    /// heap along the way. `None` when no live records remain.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        let mut inner = self.inner.lock();
        while let Some(record) = inner.heap.peek().copied() {
            if inner.is_stale(&record) {
                inner.heap.pop();
                continue;
            }
            return Some(record.deadline);
        }
        None
    }

    /// Remove every entry whose deadline has passed, staging notifications
    /// in deadline order for the caller to fire outside the lock.
    pub(crate) fn drain_due(&self) -> Vec<StagedNotify> {
        let now = Instant::now();
        let mut due = Vec::new();

        let mut inner = self.inner.lock();
        while let Some(record) = inner.heap.peek().copied() {
            if record.deadline > now {
                break;
            }
            inner.heap.pop();
            if inner.is_stale(&record) {
                continue;
            }
            if let Some(entry) = inner.unlink(record.key) {
                self.size.fetch_sub(1, Ordering::Relaxed);
                due.push(StagedNotify {
                    callback: entry.on_expire,
                    key: record.key,
                });
            }
        }
        due
    }

    /// Copy every live entry in insertion order.
    pub fn snapshot(&self) -> Vec<EntrySnapshot<V>>
    where
        V: Clone,
    {
        let inner = self.inner.lock();
        let mut out = Vec::with_capacity(inner.by_key.len());
        let mut cursor = inner.head;
        while let Some(key) = cursor {
            match inner.by_key.get(&key) {
                Some(entry) => {
                    out.push(EntrySnapshot {
                        key,
                        value: entry.value.clone(),
                        deadline: entry.deadline,
                        expires_at: entry.expires_at,
                    });
                    cursor = entry.next;
                }
                None => break,
            }
        }
        out
    }

    /// Copy a single live entry.
    pub fn entry_snapshot(&self, key: i64) -> Option<EntrySnapshot<V>>
    where
        V: Clone,
    {
        let inner = self.inner.lock();
        inner.by_key.get(&key).map(|entry| EntrySnapshot {
            key,
            value: entry.value.clone(),
            deadline: entry.deadline,
            expires_at: entry.expires_at,
        })
    }
}

impl<V> StoreInner<V> {
    /// A record is stale when its key is gone or the entry's deadline was
    /// refreshed past the record's.
    fn is_stale(&self, record: &HeapRecord) -> bool {
        match self.by_key.get(&record.key) {
            None => true,
            Some(entry) => entry.deadline > record.deadline,
        }
    }

    fn push_back(&mut self, key: i64, mut entry: Entry<V>) {
        entry.prev = self.tail;
        entry.next = None;
        match self.tail {
            Some(tail_key) => {
                if let Some(tail) = self.by_key.get_mut(&tail_key) {
                    tail.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.by_key.insert(key, entry);
    }

    fn unlink(&mut self, key: i64) -> Option<Entry<V>> {
        let entry = self.by_key.remove(&key)?;
        match entry.prev {
            Some(prev_key) => {
                if let Some(prev) = self.by_key.get_mut(&prev_key) {
                    prev.next = entry.next;
                }
            }
            None => self.head = entry.next,
        }
        match entry.next {
            Some(next_key) => {
                if let Some(next) = self.by_key.get_mut(&next_key) {
                    next.prev = entry.prev;
                }
            }
            None => self.tail = entry.prev,
        }
        Some(entry)
    }
}
