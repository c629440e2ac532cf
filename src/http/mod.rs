//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware/request_context.rs (trace/tenant extraction, scope)
//!     → handlers.rs (authenticate → rate limit → downstream calls)
//!     → schemas.rs shapes the response; errors render via GatewayError
//! ```

pub mod handlers;
pub mod middleware;
pub mod schemas;
pub mod server;

pub use server::{build_router, build_state, AppState, GatewayServer};
