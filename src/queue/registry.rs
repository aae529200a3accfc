//! The tenant registry: the public queue API.
//!
//! A [`SmartQueue`] owns every tenant's [`OrderedStore`] plus the per-tenant
//! expiry workers. Tenants are created lazily on first use with a
//! double-checked read-then-write on the tenant map, so steady-state access
//! to a hot tenant costs one read-lock acquisition.
//!
//! # Locking
//!
//! The tenant map's reader/writer lock is never held while an ordered
//! store's mutex is taken: operations clone the tenant's `Arc` out of the
//! map, drop the map guard, then work against the store. User callbacks are
//! staged under the store lock and fired only after it is released.

use crate::core::config::QueueConfig;
use crate::store::entry::ExpiryCallback;
use crate::store::ordered::{LookupOutcome, OrderedStore, TakeFrontOutcome};
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Multi-tenant, in-memory, bounded TTL keyed queue.
///
/// Cheap to clone; clones share the same tenants and workers. Operations
/// must run inside a tokio runtime because creating a tenant spawns its
/// expiry worker.
pub struct SmartQueue<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for SmartQueue<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<V> {
    /// Tenant id to store. Guarded independently of any store mutex.
    tenants: RwLock<HashMap<String, Arc<OrderedStore<V>>>>,
    /// Capacity template applied to new tenants.
    capacity: usize,
    /// Worker idle poll interval.
    poll_interval: Duration,
    /// Shutdown broadcast observed by every worker.
    shutdown_tx: watch::Sender<bool>,
    /// Outstanding worker handles, joined by `stop`.
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Set once by `stop`; all operations become no-ops afterwards.
    stopped: AtomicBool,
}

impl<V> SmartQueue<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a queue from validated settings.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            shared: Arc::new(Shared {
                tenants: RwLock::new(HashMap::new()),
                capacity: config.capacity,
                poll_interval: config.poll_interval(),
                shutdown_tx,
                workers: Mutex::new(Vec::new()),
                stopped: AtomicBool::new(false),
            }),
        })
    }

    /// Create a queue with the given per-tenant capacity and default worker
    /// cadence.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(QueueConfig {
            capacity,
            ..QueueConfig::default()
        })
    }

    /// Insert or overwrite an entry.
    ///
    /// A repeat key refreshes the value and deadline in place: the entry
    /// keeps its insertion-order position and its original callback, and
    /// the write never counts against capacity. A new key admitted into a
    /// full tenant evicts the oldest entry, firing that entry's callback,
    /// and returns `true`.
    ///
    /// The tenant is created (and its expiry worker spawned) on first use.
    pub fn enqueue(
        &self,
        tenant: &str,
        key: i64,
        value: V,
        on_expire: ExpiryCallback,
        ttl: Duration,
    ) -> bool {
        if self.is_stopped() {
            tracing::debug!(tenant = %tenant, key, "enqueue after stop ignored");
            return false;
        }

        let store = self.ensure_store(tenant);
        let admission = store.admit(key, value, on_expire, ttl);
        if let Some(evicted) = admission.evicted {
            tracing::trace!(tenant = %tenant, key = evicted.key, "evicted oldest entry");
            (evicted.callback)(tenant, evicted.key);
        }
        admission.capacity_reached
    }

    /// Look up an entry's value without removing it.
    ///
    /// Despite the historical name this is a lookup, not a removal: a live
    /// hit leaves the entry in place. An entry found past its deadline is
    /// removed, its callback fires, and the call returns `None`.
    pub fn pop(&self, tenant: &str, key: i64) -> Option<V> {
        if self.is_stopped() {
            return None;
        }
        let store = self.store(tenant)?;
        match store.lookup(key) {
            LookupOutcome::Live(value) => Some(value),
            LookupOutcome::Expired(notify) => {
                (notify.callback)(tenant, notify.key);
                None
            }
            LookupOutcome::Missing => None,
        }
    }

    /// Remove and return the oldest entry (FIFO by insertion order;
    /// overwrites do not reset position).
    ///
    /// An expired front entry is removed with its callback fired and `None`
    /// returned; one call consumes at most one front item.
    pub fn dequeue(&self, tenant: &str) -> Option<(i64, V)> {
        if self.is_stopped() {
            return None;
        }
        let store = self.store(tenant)?;
        match store.take_front() {
            TakeFrontOutcome::Taken(key, value) => Some((key, value)),
            TakeFrontOutcome::ExpiredFront(notify) => {
                (notify.callback)(tenant, notify.key);
                None
            }
            TakeFrontOutcome::Empty => None,
        }
    }

    /// Delete an entry without firing its callback. A no-op for unknown
    /// tenants or keys.
    pub fn remove(&self, tenant: &str, key: i64) {
        if self.is_stopped() {
            return;
        }
        if let Some(store) = self.store(tenant) {
            store.discard(key);
        }
    }

    /// Create the tenant (and its expiry worker) if it does not exist yet.
    pub fn ensure_tenant(&self, tenant: &str) {
        if !self.is_stopped() {
            self.ensure_store(tenant);
        }
    }

    /// Debug accessor for a tenant's store.
    pub fn ordered_store(&self, tenant: &str) -> Option<Arc<OrderedStore<V>>> {
        self.store(tenant)
    }

    /// Ids of every tenant created so far, sorted.
    pub fn tenant_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.shared.tenants.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Live entry count for a tenant; 0 for unknown tenants. Lock-free on
    /// the store itself.
    pub fn len(&self, tenant: &str) -> usize {
        self.store(tenant).map(|s| s.len()).unwrap_or(0)
    }

    /// Heap record count (live plus stale) for a tenant.
    pub fn heap_depth(&self, tenant: &str) -> usize {
        self.store(tenant).map(|s| s.heap_depth()).unwrap_or(0)
    }

    /// A receiver on the shutdown broadcast, for coordinating auxiliary
    /// tasks (e.g. the inspection server) with `stop`.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shared.shutdown_tx.subscribe()
    }

    /// Whether `stop` has been called.
    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Signal every expiry worker and wait for them to terminate.
    ///
    /// Idempotent; after the first call every queue operation is a
    /// consistent no-op. In-flight callbacks complete; pending expired
    /// entries may or may not be delivered.
    pub async fn stop(&self) {
        if self.shared.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.shared.shutdown_tx.send(true);

        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.shared.workers.lock());
        for handle in workers {
            let _ = handle.await;
        }
        tracing::info!("smartqueue stopped");
    }

    fn store(&self, tenant: &str) -> Option<Arc<OrderedStore<V>>> {
        self.shared.tenants.read().get(tenant).cloned()
    }

    /// Double-checked tenant creation: read lock first, write lock with a
    /// re-check only on miss. The worker is spawned while the write lock is
    /// held so a tenant is never observable without its worker.
    fn ensure_store(&self, tenant: &str) -> Arc<OrderedStore<V>> {
        if let Some(store) = self.shared.tenants.read().get(tenant) {
            return store.clone();
        }

        let mut tenants = self.shared.tenants.write();
        if let Some(store) = tenants.get(tenant) {
            return store.clone();
        }

        let store = Arc::new(OrderedStore::new(self.shared.capacity));
        tenants.insert(tenant.to_string(), store.clone());

        let handle = tokio::spawn(crate::queue::worker::run_expiry_worker(
            tenant.to_string(),
            store.clone(),
            self.shared.poll_interval,
            self.shared.shutdown_tx.subscribe(),
        ));
        self.shared.workers.lock().push(handle);

        tracing::debug!(tenant = %tenant, capacity = self.shared.capacity, "tenant created");
        store
    }
}
