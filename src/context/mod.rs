//! Request-scoped context propagation.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware extracts x-request-id / x-tenant-id
//!     → store::scope() makes a RequestContext current for the chain
//!     → auth attaches the Principal (store::attach_principal)
//!     → downstream facade reads store::current() to build headers
//!     → scope ends, context torn down on every exit path
//! ```
//!
//! # Design Decisions
//! - Chain-local storage (tokio task-local) instead of threading the
//!   context through every call signature
//! - Each chain owns its context value; no cross-chain locking
//! - Reading outside an active scope is a programming error and panics

pub mod principal;
pub mod store;

pub use principal::Principal;
pub use store::{
    attach_principal, current, generate_trace_id, scope, try_current, RequestContext,
};

use axum::http::HeaderName;

/// Header carrying the request trace id, inbound and outbound.
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
/// Header carrying the tenant id, inbound and outbound.
pub const TENANT_ID_HEADER: HeaderName = HeaderName::from_static("x-tenant-id");
/// Header carrying the authenticated user id on downstream calls.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
/// Header carrying the comma-joined caller roles on downstream calls.
pub const USER_ROLES_HEADER: HeaderName = HeaderName::from_static("x-user-roles");
