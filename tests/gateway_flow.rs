//! End-to-end flows through the router with stub collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use edge_gateway::auth::{AuthGateway, StaticIntrospector};
use edge_gateway::config::GatewayConfig;
use edge_gateway::downstream::documents::{DocumentFilters, DocumentStore, StubDocumentStore};
use edge_gateway::downstream::ingestion::StubIngestionQueue;
use edge_gateway::downstream::orchestrator::StubAssistantOrchestrator;
use edge_gateway::downstream::safety::{SafetyEvaluator, StubSafetyEvaluator};
use edge_gateway::error::GatewayError;
use edge_gateway::http::schemas::{DocumentDetail, DocumentItem, SafetyCheckResult};
use edge_gateway::http::{build_router, AppState};
use edge_gateway::security::RateLimiter;

fn stub_state(limit: usize) -> AppState {
    AppState {
        auth: Arc::new(AuthGateway::new(Arc::new(StaticIntrospector))),
        limiter: Arc::new(RateLimiter::new(limit)),
        documents: Arc::new(StubDocumentStore),
        ingestion: Arc::new(StubIngestionQueue),
        safety: Arc::new(StubSafetyEvaluator),
        orchestrator: Arc::new(StubAssistantOrchestrator),
    }
}

fn router_with(state: AppState) -> axum::Router {
    build_router(&GatewayConfig::default(), state)
}

fn router(limit: usize) -> axum::Router {
    router_with(stub_state(limit))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, "Bearer demo")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn healthz_is_public() {
    let response = router(10)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn missing_bearer_is_unauthenticated() {
    let response = router(10)
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "unauthenticated");
    assert!(body["trace_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn me_returns_the_offline_principal() {
    let response = router(10).oneshot(get("/api/v1/auth/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // The tenant learned during authentication is echoed back.
    assert_eq!(response.headers()["x-tenant-id"], "demo");

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "demo");
    assert_eq!(body["username"], "demo");
    assert_eq!(body["roles"], serde_json::json!(["admin"]));
}

#[tokio::test]
async fn inbound_trace_id_is_reused_and_echoed() {
    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let response = router(10).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-123");
    // Unauthenticated failure, but the error body still carries the trace.
    let body = body_json(response).await;
    assert_eq!(body["trace_id"], "trace-123");
}

#[tokio::test]
async fn documents_list_is_empty_from_the_stub() {
    let response = router(10).oneshot(get("/api/v1/documents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn document_detail_echoes_the_id() {
    let response = router(10)
        .oneshot(get("/api/v1/documents/doc_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["doc_id"], "doc_1");
    assert_eq!(body["status"], "unknown");
}

#[tokio::test]
async fn third_call_in_the_window_is_rate_limited() {
    let app = router(2);
    for _ in 0..2 {
        let response = app.clone().oneshot(get("/api/v1/documents")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/api/v1/documents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["code"], "rate_limit_exceeded");
    assert!(body["retry_after"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn quota_keys_are_scoped_per_operation() {
    let app = router(1);
    let list = app.clone().oneshot(get("/api/v1/documents")).await.unwrap();
    assert_eq!(list.status(), StatusCode::OK);

    // A different operation for the same caller has its own window.
    let detail = app
        .clone()
        .oneshot(get("/api/v1/documents/doc_1"))
        .await
        .unwrap();
    assert_eq!(detail.status(), StatusCode::OK);
}

#[tokio::test]
async fn assistant_query_round_trip() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/assistant/query")
        .header(AUTHORIZATION, "Bearer demo")
        .header("content-type", "application/json")
        .header("x-request-id", "trace-assist")
        .body(Body::from(r#"{"query": "how do I reset?"}"#))
        .unwrap();

    let response = router(10).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["answer"], "stubbed assistant response");
    assert_eq!(body["meta"]["trace_id"], "trace-assist");
    assert_eq!(body["meta"]["safety"]["status"], "allowed");
}

#[tokio::test]
async fn upload_is_accepted() {
    let boundary = "X-UPLOAD-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"doc.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello world\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"product\"\r\n\r\n\
         Orion\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/documents/upload")
        .header(AUTHORIZATION, "Bearer demo")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router(10).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert!(body["doc_id"].as_str().unwrap().starts_with("stub_"));
    assert_eq!(body["status"], "uploaded");
}

#[tokio::test]
async fn upload_without_a_file_is_rejected() {
    let boundary = "X-UPLOAD-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"product\"\r\n\r\n\
         Orion\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/documents/upload")
        .header(AUTHORIZATION, "Bearer demo")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router(10).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_request");
}

/// Evaluator that blocks everything, standing in for a policy rejection.
struct BlockingSafetyEvaluator;

#[async_trait]
impl SafetyEvaluator for BlockingSafetyEvaluator {
    async fn check_input(&self, _payload: Value) -> Result<SafetyCheckResult, GatewayError> {
        Ok(SafetyCheckResult {
            status: "blocked".to_string(),
            reason: Some("policy says no".to_string()),
        })
    }
}

#[tokio::test]
async fn blocked_queries_are_forbidden() {
    let mut state = stub_state(10);
    state.safety = Arc::new(BlockingSafetyEvaluator);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/assistant/query")
        .header(AUTHORIZATION, "Bearer demo")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"query": "something nasty"}"#))
        .unwrap();

    let response = router_with(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "policy says no");
}

/// Store whose failures arrive pre-shaped as gateway errors.
struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn list(
        &self,
        _tenant_id: &str,
        _filters: &DocumentFilters,
    ) -> Result<Vec<DocumentItem>, GatewayError> {
        Err(GatewayError::UpstreamRejected {
            service: "documents".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        })
    }

    async fn fetch(&self, _doc_id: &str) -> Result<DocumentDetail, GatewayError> {
        Err(GatewayError::NotConfigured {
            service: "documents".to_string(),
        })
    }
}

#[tokio::test]
async fn facade_errors_pass_through_unchanged() {
    let mut state = stub_state(10);
    state.documents = Arc::new(FailingDocumentStore);
    let app = router_with(state);

    let rejected = app.clone().oneshot(get("/api/v1/documents")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(rejected).await;
    assert_eq!(body["code"], "upstream_rejected");
    assert_eq!(body["message"], "boom");

    let not_configured = app
        .clone()
        .oneshot(get("/api/v1/documents/doc_1"))
        .await
        .unwrap();
    assert_eq!(not_configured.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(not_configured).await["code"], "not_configured");
}
