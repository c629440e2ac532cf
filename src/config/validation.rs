//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits ≥ 1, timeouts > 0)
//! - Check URL shapes before they reach the outbound clients
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<...>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("rate_limit.per_minute must be at least 1")]
    ZeroRateLimit,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must use http or https: '{value}'")]
    UnsupportedScheme { field: &'static str, value: String },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, reporting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.per_minute == 0 {
        errors.push(ValidationError::ZeroRateLimit);
    }

    for (field, value) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.downstream_secs", config.timeouts.downstream_secs),
        ("auth.timeout_secs", config.auth.timeout_secs),
        (
            "rate_limit.sweep_interval_secs",
            config.rate_limit.sweep_interval_secs,
        ),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    check_url(
        &mut errors,
        "auth.introspection_url",
        config.auth.introspection_url.as_deref(),
    );
    check_url(
        &mut errors,
        "downstreams.documents.base_url",
        config.downstreams.documents.base_url.as_deref(),
    );
    check_url(
        &mut errors,
        "downstreams.ingestion.base_url",
        config.downstreams.ingestion.base_url.as_deref(),
    );
    check_url(
        &mut errors,
        "downstreams.safety.base_url",
        config.downstreams.safety.base_url.as_deref(),
    );
    check_url(
        &mut errors,
        "downstreams.orchestrator.base_url",
        config.downstreams.orchestrator.base_url.as_deref(),
    );

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: Option<&str>) {
    let Some(raw) = value else { return };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => errors.push(ValidationError::UnsupportedScheme {
            field,
            value: raw.to_string(),
        }),
        Err(_) => errors.push(ValidationError::InvalidUrl {
            field,
            value: raw.to_string(),
        }),
    }
}
