//! Inspection HTTP server.
//!
//! Serves a read-only JSON view of live entries:
//!
//! - `GET /smartqueue/tenant/{tenant}` - every live entry of a tenant, in
//!   insertion order (404 for unknown tenants)
//! - `GET /smartqueue/tenant/{tenant}/entry/{key}` - one entry (404 for
//!   unknown tenant or key, 400 for a key that is not a 64-bit integer)
//!
//! Snapshots are taken under the tenant's store lock; serialization happens
//! outside it. The server shuts down with the queue's shutdown broadcast.

use crate::core::error::{SmartQueueError, SmartQueueResult};
use crate::queue::registry::SmartQueue;
use crate::store::entry::EntrySnapshot;
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::{Instant, UNIX_EPOCH};
use tokio::sync::watch;

/// JSON view of a single live entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView<V> {
    pub key: i64,
    pub value: V,
    /// Absolute deadline as seconds since the Unix epoch.
    pub expiry_time: u64,
    /// Signed milliseconds until the deadline; negative once past due.
    pub ttl_remaining_ms: i64,
}

impl<V> EntryView<V> {
    fn from_snapshot(snapshot: EntrySnapshot<V>) -> Self {
        let expiry_time = snapshot
            .expires_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let now = Instant::now();
        let ttl_remaining_ms = if snapshot.deadline >= now {
            (snapshot.deadline - now).as_millis() as i64
        } else {
            -((now - snapshot.deadline).as_millis() as i64)
        };
        Self {
            key: snapshot.key,
            value: snapshot.value,
            expiry_time,
            ttl_remaining_ms,
        }
    }
}

/// Build the inspection router over a queue handle.
pub fn router<V>(queue: SmartQueue<V>) -> Router
where
    V: Clone + Send + Sync + Serialize + 'static,
{
    Router::new()
        .route("/smartqueue/tenant/:tenant", get(list_tenant::<V>))
        .route(
            "/smartqueue/tenant/:tenant/entry/:key",
            get(entry_detail::<V>),
        )
        .with_state(queue)
}

async fn list_tenant<V>(
    State(queue): State<SmartQueue<V>>,
    Path(tenant): Path<String>,
) -> SmartQueueResult<Json<Vec<EntryView<V>>>>
where
    V: Clone + Send + Sync + Serialize + 'static,
{
    if queue.is_stopped() {
        return Err(SmartQueueError::Stopped);
    }
    let store = queue
        .ordered_store(&tenant)
        .ok_or(SmartQueueError::TenantNotFound {
            tenant: tenant.clone(),
        })?;
    let views = store
        .snapshot()
        .into_iter()
        .map(EntryView::from_snapshot)
        .collect();
    Ok(Json(views))
}

async fn entry_detail<V>(
    State(queue): State<SmartQueue<V>>,
    Path((tenant, raw_key)): Path<(String, String)>,
) -> SmartQueueResult<Json<EntryView<V>>>
where
    V: Clone + Send + Sync + Serialize + 'static,
{
    if queue.is_stopped() {
        return Err(SmartQueueError::Stopped);
    }
    let key: i64 = raw_key
        .parse()
        .map_err(|_| SmartQueueError::InvalidKey { raw: raw_key })?;
    let store = queue
        .ordered_store(&tenant)
        .ok_or(SmartQueueError::TenantNotFound {
            tenant: tenant.clone(),
        })?;
    let snapshot = store
        .entry_snapshot(key)
        .ok_or(SmartQueueError::EntryNotFound { tenant, key })?;
    Ok(Json(EntryView::from_snapshot(snapshot)))
}

/// The inspection HTTP server.
pub struct InspectionServer<V> {
    queue: SmartQueue<V>,
    bind: SocketAddr,
}

impl<V> InspectionServer<V>
where
    V: Clone + Send + Sync + Serialize + 'static,
{
    /// Create a server over a queue handle.
    pub fn new(queue: SmartQueue<V>, bind: SocketAddr) -> Self {
        Self { queue, bind }
    }

    /// Serve until the shutdown broadcast fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .with_context(|| format!("failed to bind inspection server on {}", self.bind))?;
        tracing::info!(bind = %self.bind, "inspection server listening");

        let app = router(self.queue.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await
            .context("inspection server failed")?;

        tracing::info!("inspection server stopped");
        Ok(())
    }
}
