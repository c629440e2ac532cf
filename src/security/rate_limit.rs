//! Sliding-window rate limiting keyed per caller and operation.
//!
//! # Responsibilities
//! - Admit at most `limit` events per key in any trailing 60-second window
//! - Serialize eviction + check + append per key, never across keys
//! - Reap idle keys so the key space does not grow without bound
//!
//! # Design Decisions
//! - Keys are opaque strings shaped `operation:tenant:user`
//! - State is in-memory only; quotas reset on process restart
//! - An admitted slot is consumed even if the chain is cancelled afterwards

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::GatewayError;
use crate::observability::metrics;

/// Length of the rolling window.
const WINDOW: Duration = Duration::from_secs(60);

/// Concurrency-safe sliding-window rate limiter shared by all chains.
pub struct RateLimiter {
    limit: usize,
    windows: DashMap<String, Arc<Mutex<VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// Create a limiter admitting `limit` events per key per minute.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            windows: DashMap::new(),
        }
    }

    /// Admit or reject one event for `key`.
    ///
    /// On rejection, `retry_after` is the ceiling of the seconds until the
    /// oldest admitted event ages out of the window, at least 1.
    pub async fn check(&self, key: &str) -> Result<(), GatewayError> {
        let window = {
            let entry = self.windows.entry(key.to_string()).or_default();
            Arc::clone(&entry)
            // The map shard guard drops here; only the per-key mutex is
            // held across the critical section, so other keys stay free.
        };
        let mut hits = window.lock().await;

        let now = Instant::now();
        while hits.front().is_some_and(|t| now.duration_since(*t) > WINDOW) {
            hits.pop_front();
        }

        if hits.len() >= self.limit {
            let oldest = *hits.front().expect("window holds at least `limit` entries");
            let remaining = WINDOW.saturating_sub(now.duration_since(oldest));
            let retry_after = (remaining.as_secs_f64().ceil() as u64).max(1);
            tracing::warn!(key = %key, retry_after, "rate limit exceeded");
            metrics::record_rate_limited(operation_of(key));
            return Err(GatewayError::RateLimited { retry_after });
        }

        hits.push_back(now);
        Ok(())
    }

    /// Drop keys whose window holds no live entries.
    ///
    /// Keys whose mutex is currently contended are in active use and kept.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.windows.retain(|_, window| {
            let Ok(mut hits) = window.try_lock() else {
                return true;
            };
            while hits.front().is_some_and(|t| now.duration_since(*t) > WINDOW) {
                hits.pop_front();
            }
            !hits.is_empty()
        });
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// Operation prefix of a rate key, used as a low-cardinality metric label.
fn operation_of(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}
