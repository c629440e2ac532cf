//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging; the trace id flows through all subsystems
//! - Metric updates are cheap (atomic increments)
//! - The metrics endpoint is optional and off by default

pub mod logging;
pub mod metrics;
