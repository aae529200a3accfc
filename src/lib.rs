//! smartqueue - multi-tenant, in-memory, bounded TTL keyed queue.
//!
//! Each tenant is an isolated namespace of keyed entries. Every entry
//! carries a value, an expiry deadline, and a user-supplied callback that
//! fires when the entry leaves the store involuntarily (deadline expiry or
//! capacity eviction). Tenants get per-tenant FIFO ordering, direct key
//! access, a fixed capacity, and a dedicated background expiry worker.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SmartQueue                           │
//! │     enqueue │ pop │ dequeue │ remove │ stop │ inspection    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Tenant Registry                        │
//! │        tenant id → OrderedStore  (lazy, RwLock map)         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────────────────────┐  ┌───────────────────────────┐
//! │    OrderedStore (per tenant) │  │ Expiry Worker (per tenant)│
//! │  key map │ FIFO list │ heap  │  │  sleep → drain → notify   │
//! └──────────────────────────────┘  └───────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::error`] - Error types and HTTP status mapping
//! - [`store::ordered`] - Per-tenant ordered store (key index,
//!   insertion-order list, expiry heap)
//! - [`queue::registry`] - Tenant registry and the public queue API
//! - [`inspect::server`] - Read-only HTTP inspection endpoints
//! - [`cli::commands`] - CLI command implementations
//!
//! # Key Invariants
//!
//! - Overwriting a key refreshes its value and deadline without moving it
//!   in the insertion order and without counting against capacity.
//! - A tenant never holds more than `capacity` live entries; admitting a
//!   new key into a full tenant evicts the oldest, firing its callback.
//! - Heap records are immutable; a record superseded by a later enqueue is
//!   skipped silently when it reaches the top of the heap.
//! - User callbacks never run under a store lock.
//! - `remove` never fires a callback.

// Core infrastructure
pub mod core;

// Per-tenant storage
pub mod store;

// Tenant registry and expiry workers
pub mod queue;

// Inspection HTTP surface
pub mod inspect;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::config::Config;
pub use self::core::error::{SmartQueueError, SmartQueueResult};
pub use inspect::server::{router as inspection_router, EntryView, InspectionServer};
pub use queue::registry::SmartQueue;
pub use store::entry::{EntrySnapshot, ExpiryCallback};
pub use store::ordered::OrderedStore;
