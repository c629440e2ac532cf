//! Content-safety evaluator client.
//!
//! The evaluator's policy logic is a black box; the gateway only forwards
//! the query payload and acts on the allowed/blocked verdict.

use async_trait::async_trait;

use crate::downstream::facade::{DownstreamCallSpec, DownstreamFacade};
use crate::error::GatewayError;
use crate::http::schemas::SafetyCheckResult;

/// Screens caller input before it reaches the assistant pipeline.
#[async_trait]
pub trait SafetyEvaluator: Send + Sync {
    async fn check_input(
        &self,
        payload: serde_json::Value,
    ) -> Result<SafetyCheckResult, GatewayError>;
}

/// Live client backed by the safety service.
pub struct HttpSafetyEvaluator {
    facade: DownstreamFacade,
}

impl HttpSafetyEvaluator {
    pub fn new(facade: DownstreamFacade) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl SafetyEvaluator for HttpSafetyEvaluator {
    async fn check_input(
        &self,
        payload: serde_json::Value,
    ) -> Result<SafetyCheckResult, GatewayError> {
        self.facade
            .request_json(DownstreamCallSpec::post_json(
                "internal/safety/input-check",
                payload,
            ))
            .await
    }
}

/// Deterministic stand-in that allows everything.
pub struct StubSafetyEvaluator;

#[async_trait]
impl SafetyEvaluator for StubSafetyEvaluator {
    async fn check_input(
        &self,
        _payload: serde_json::Value,
    ) -> Result<SafetyCheckResult, GatewayError> {
        Ok(SafetyCheckResult {
            status: "allowed".to_string(),
            reason: Some("stub".to_string()),
        })
    }
}
