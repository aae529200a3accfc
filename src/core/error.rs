//! Error types and HTTP status mapping.
//!
//! Queue operations themselves are infallible: absence is expressed as an
//! `Option` or a `bool`, and eviction is reported as a boolean. The error
//! enum here exists for the user-reachable surfaces (the inspection HTTP
//! server and the CLI), where absence and bad input become status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// User-reachable smartqueue error conditions.
#[derive(Debug, Error)]
pub enum SmartQueueError {
    /// Tenant has never been created.
    #[error("tenant {tenant} not found")]
    TenantNotFound { tenant: String },

    /// Key is not live in the tenant.
    #[error("entry {key} not found in tenant {tenant}")]
    EntryNotFound { tenant: String, key: i64 },

    /// Key path segment did not parse as a 64-bit signed integer.
    #[error("invalid entry key: {raw}")]
    InvalidKey { raw: String },

    /// The queue has been stopped; no further operations are served.
    #[error("queue is stopped")]
    Stopped,
}

/// Result type using SmartQueueError.
pub type SmartQueueResult<T> = Result<T, SmartQueueError>;

impl SmartQueueError {
    /// Map an error to its inspection HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::TenantNotFound { .. } | Self::EntryNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidKey { .. } => StatusCode::BAD_REQUEST,
            Self::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for SmartQueueError {
    fn into_response(self) -> Response {
        (self.http_status(), self.to_string()).into_response()
    }
}
