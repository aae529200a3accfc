//! Per-tenant ordered storage.
//!
//! - [`entry`] - Per-item record and expiry scheduling types
//! - [`ordered`] - The ordered store: key index, insertion-order list,
//!   expiry heap, capacity accounting

pub mod entry;
pub mod ordered;
