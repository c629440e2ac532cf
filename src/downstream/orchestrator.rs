//! Assistant orchestrator client.

use async_trait::async_trait;

use crate::downstream::facade::{DownstreamCallSpec, DownstreamFacade};
use crate::error::GatewayError;
use crate::http::schemas::{AssistantResponse, AssistantResponseMeta};

/// Answers caller queries through the assistant pipeline.
#[async_trait]
pub trait AssistantOrchestrator: Send + Sync {
    async fn query(&self, payload: serde_json::Value) -> Result<AssistantResponse, GatewayError>;
}

/// Live client backed by the orchestrator service.
pub struct HttpAssistantOrchestrator {
    facade: DownstreamFacade,
}

impl HttpAssistantOrchestrator {
    pub fn new(facade: DownstreamFacade) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl AssistantOrchestrator for HttpAssistantOrchestrator {
    async fn query(&self, payload: serde_json::Value) -> Result<AssistantResponse, GatewayError> {
        self.facade
            .request_json(DownstreamCallSpec::post_json(
                "internal/assistant/query",
                payload,
            ))
            .await
    }
}

/// Deterministic stand-in echoing the trace id from the payload.
pub struct StubAssistantOrchestrator;

#[async_trait]
impl AssistantOrchestrator for StubAssistantOrchestrator {
    async fn query(&self, payload: serde_json::Value) -> Result<AssistantResponse, GatewayError> {
        let trace_id = payload
            .get("trace_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(AssistantResponse {
            answer: "stubbed assistant response".to_string(),
            sources: Vec::new(),
            meta: AssistantResponseMeta {
                latency_ms: None,
                trace_id,
                safety: None,
            },
        })
    }
}
