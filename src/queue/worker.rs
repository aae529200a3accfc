//! Per-tenant expiry worker.
//!
//! Each tenant gets one long-running task that delivers expiry callbacks
//! for entries whose deadline has passed. An iteration is one of:
//!
//! - **Idle-empty**: no live heap records; wait for shutdown or one poll
//!   interval, which bounds the wakeup latency when an entry lands in a
//!   previously empty tenant.
//! - **Idle-future**: earliest live deadline is ahead; wait for shutdown or
//!   the remaining delay. The delay is recomputed every iteration, so an
//!   enqueue with an earlier deadline is picked up on the next wakeup.
//! - **Draining**: earliest deadline has passed; remove every due entry
//!   under the store lock, then fire the staged callbacks with the lock
//!   released.

use crate::store::ordered::OrderedStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub(crate) async fn run_expiry_worker<V>(
    tenant: String,
    store: Arc<OrderedStore<V>>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    V: Send + Sync + 'static,
{
    tracing::debug!(tenant = %tenant, "expiry worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let wait = match store.next_deadline() {
            None => poll_interval,
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    let due = store.drain_due();
                    if !due.is_empty() {
                        tracing::trace!(
                            tenant = %tenant,
                            count = due.len(),
                            "delivering expiry notifications"
                        );
                    }
                    for notify in due {
                        (notify.callback)(&tenant, notify.key);
                    }
                    continue;
                }
                deadline - now
            }
        };

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(wait) => {}
        }
    }

    tracing::debug!(tenant = %tenant, "expiry worker stopped");
}
