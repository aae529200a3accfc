//! Read-only HTTP inspection surface.
//!
//! - [`server`] - axum router and server for listing tenants and entries
//!   as JSON

pub mod server;
