//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request context, timeout, tracing)
//! - Construct the auth gateway and downstream clients from config,
//!   selecting live or stub variants once
//! - Run the server with graceful shutdown
//! - Spawn the rate-limiter sweeper

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::auth::{AuthGateway, HttpIntrospector, StaticIntrospector, TokenIntrospector};
use crate::config::{GatewayConfig, ServiceConfig};
use crate::downstream::documents::{DocumentStore, HttpDocumentStore, StubDocumentStore};
use crate::downstream::facade::DownstreamFacade;
use crate::downstream::ingestion::{HttpIngestionQueue, IngestionQueue, StubIngestionQueue};
use crate::downstream::orchestrator::{
    AssistantOrchestrator, HttpAssistantOrchestrator, StubAssistantOrchestrator,
};
use crate::downstream::safety::{HttpSafetyEvaluator, SafetyEvaluator, StubSafetyEvaluator};
use crate::http::handlers;
use crate::http::middleware::request_context::request_context_middleware;
use crate::security::RateLimiter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGateway>,
    pub limiter: Arc<RateLimiter>,
    pub documents: Arc<dyn DocumentStore>,
    pub ingestion: Arc<dyn IngestionQueue>,
    pub safety: Arc<dyn SafetyEvaluator>,
    pub orchestrator: Arc<dyn AssistantOrchestrator>,
}

/// HTTP server for the edge gateway.
pub struct GatewayServer {
    router: Router,
    limiter: Arc<RateLimiter>,
    sweep_interval: Duration,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = build_state(&config);
        let limiter = state.limiter.clone();
        let router = build_router(&config, state);
        Self {
            router,
            limiter,
            sweep_interval: Duration::from_secs(config.rate_limit.sweep_interval_secs),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway listening");

        // Reap idle rate-limit keys in the background.
        let limiter = self.limiter.clone();
        let sweep_interval = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.sweep();
                tracing::debug!(
                    tracked_keys = limiter.tracked_keys(),
                    "rate limiter sweep complete"
                );
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

/// Build the application state from config.
///
/// Live vs. stub collaborators are chosen here, once; nothing downstream
/// checks a mode flag again.
pub fn build_state(config: &GatewayConfig) -> AppState {
    let client = reqwest::Client::new();
    let timeout = Duration::from_secs(config.timeouts.downstream_secs);

    let introspector: Arc<dyn TokenIntrospector> = match introspection_endpoint(config) {
        Some(endpoint) => Arc::new(HttpIntrospector::new(
            client.clone(),
            endpoint,
            config.auth.audience.clone(),
            Duration::from_secs(config.auth.timeout_secs),
        )),
        None => Arc::new(StaticIntrospector),
    };

    let documents: Arc<dyn DocumentStore> = if config.stub_mode {
        Arc::new(StubDocumentStore)
    } else {
        Arc::new(HttpDocumentStore::new(facade(
            &client,
            "documents",
            &config.downstreams.documents,
            timeout,
        )))
    };
    let ingestion: Arc<dyn IngestionQueue> = if config.stub_mode {
        Arc::new(StubIngestionQueue)
    } else {
        Arc::new(HttpIngestionQueue::new(facade(
            &client,
            "ingestion",
            &config.downstreams.ingestion,
            timeout,
        )))
    };
    let safety: Arc<dyn SafetyEvaluator> = if config.stub_mode {
        Arc::new(StubSafetyEvaluator)
    } else {
        Arc::new(HttpSafetyEvaluator::new(facade(
            &client,
            "safety",
            &config.downstreams.safety,
            timeout,
        )))
    };
    let orchestrator: Arc<dyn AssistantOrchestrator> = if config.stub_mode {
        Arc::new(StubAssistantOrchestrator)
    } else {
        Arc::new(HttpAssistantOrchestrator::new(facade(
            &client,
            "orchestrator",
            &config.downstreams.orchestrator,
            timeout,
        )))
    };

    AppState {
        auth: Arc::new(AuthGateway::new(introspector)),
        limiter: Arc::new(RateLimiter::new(config.rate_limit.per_minute as usize)),
        documents,
        ingestion,
        safety,
        orchestrator,
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/api/v1/auth/me", get(handlers::read_current_user))
        .route("/api/v1/documents", get(handlers::list_documents))
        .route("/api/v1/documents/upload", post(handlers::upload_document))
        .route("/api/v1/documents/{doc_id}", get(handlers::get_document))
        .route("/api/v1/assistant/query", post(handlers::assistant_query))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(middleware::from_fn(request_context_middleware))
        .layer(TraceLayer::new_for_http())
}

fn introspection_endpoint(config: &GatewayConfig) -> Option<Url> {
    if config.stub_mode {
        return None;
    }
    config
        .auth
        .introspection_url
        .as_deref()
        .and_then(|raw| Url::parse(raw).ok())
}

fn facade(
    client: &reqwest::Client,
    service_name: &str,
    service: &ServiceConfig,
    timeout: Duration,
) -> DownstreamFacade {
    let base_url = service
        .base_url
        .as_deref()
        .and_then(|raw| Url::parse(raw).ok());
    DownstreamFacade::new(client.clone(), service_name, base_url, timeout)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
