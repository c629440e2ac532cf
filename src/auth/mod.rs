//! Caller authentication.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → bearer credential extracted from the Authorization header
//!     → TokenIntrospector validates it (live HTTP call or offline stub)
//!     → resulting Principal attached to the request context
//! ```
//!
//! # Design Decisions
//! - Live vs. offline is a trait implementation chosen once at
//!   construction, not a flag checked inside every call
//! - A missing or empty credential fails before any network I/O

pub mod introspect;

pub use introspect::{HttpIntrospector, StaticIntrospector, TokenIntrospector};

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::context::{self, Principal};
use crate::error::GatewayError;

/// Authenticates bearer credentials and seeds the request context.
pub struct AuthGateway {
    introspector: Arc<dyn TokenIntrospector>,
}

impl AuthGateway {
    pub fn new(introspector: Arc<dyn TokenIntrospector>) -> Self {
        Self { introspector }
    }

    /// Authenticate the request and attach the principal to the current
    /// context.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, GatewayError> {
        let token = bearer_token(headers)?;
        let principal = self.introspector.introspect(token).await?;
        context::attach_principal(principal.clone());
        Ok(principal)
    }
}

/// Extract the bearer credential from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, GatewayError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::unauthenticated("missing Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| GatewayError::unauthenticated("missing bearer credential"))
}
