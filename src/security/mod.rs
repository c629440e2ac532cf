//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated request:
//!     → rate_limit.rs (sliding window per operation:tenant:user key)
//!     → admitted requests continue to the downstream facade
//! ```
//!
//! # Design Decisions
//! - Quotas are enforced after authentication, keyed by principal
//! - Fail closed: a rejected check surfaces RateLimited, never passes

pub mod rate_limit;

pub use rate_limit::RateLimiter;
