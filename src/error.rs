//! Gateway error taxonomy.
//!
//! # Responsibilities
//! - Define the closed set of failure kinds surfaced to route handlers
//! - Map each kind to an HTTP status and a stable machine-readable code
//! - Render the caller-facing error body, carrying the request trace id
//!
//! # Design Decisions
//! - The taxonomy is closed: the rate limiter, auth gateway and downstream
//!   facade convert every failure into exactly one variant. A caller that
//!   already holds a `GatewayError` passes it through unchanged.
//! - Upstream status codes are preserved, never reinterpreted.
//! - Programming errors (context read outside a request scope) panic and
//!   must never be represented as a `GatewayError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::context;

/// Failures surfaced by the gateway core.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The downstream service has no base URL configured.
    #[error("{service} endpoint is not configured")]
    NotConfigured { service: String },

    /// The caller's credential is missing, invalid or inactive.
    ///
    /// Carries the identity provider's status when the rejection came from
    /// a live introspection call.
    #[error("{message}")]
    Unauthenticated { status: StatusCode, message: String },

    /// The caller is authenticated but denied the operation.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The caller exceeded its request quota for the operation.
    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// The upstream could not be reached (DNS, connect, timeout, reset).
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The upstream answered with a non-2xx status.
    #[error("{message}")]
    UpstreamRejected {
        service: String,
        status: StatusCode,
        message: String,
    },
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// An `Unauthenticated` error attributed to this gateway (plain 401).
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    /// HTTP status surfaced to the original caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthenticated { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamRejected { status, .. } => *status,
        }
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "not_configured",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Unauthorized { .. } => "unauthorized",
            Self::RateLimited { .. } => "rate_limit_exceeded",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::UpstreamRejected { .. } => "upstream_rejected",
        }
    }

    /// Seconds after which a rate-limited caller may retry.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Error body returned to the original caller.
///
/// The trace id lets a caller correlate the failure with server-side logs.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            trace_id: context::try_current().map(|ctx| ctx.trace_id),
            retry_after: self.retry_after(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}
