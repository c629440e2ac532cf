//! Edge API Gateway (v1)
//!
//! An edge gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 EDGE GATEWAY                  │
//!                      │                                               │
//!  Client Request      │  ┌──────────┐   ┌──────┐   ┌──────────────┐  │
//!  ────────────────────┼─▶│ context  │──▶│ auth │──▶│ rate limiter │  │
//!                      │  │middleware│   └──────┘   └──────┬───────┘  │
//!                      │  └──────────┘                     │          │
//!                      │                                   ▼          │
//!                      │                          ┌────────────────┐  │     Downstream
//!  Client Response     │  ┌──────────┐            │   downstream   │──┼───▶ services
//!  ◀───────────────────┼──│ schemas/ │◀───────────│     facade     │  │     (documents,
//!                      │  │  errors  │            └────────────────┘  │      ingestion,
//!                      │  └──────────┘                                │      safety, ...)
//!                      │                                               │
//!                      │  Cross-cutting: config · observability ·     │
//!                      │  security (quotas) · error taxonomy          │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::{load_config, GatewayConfig};
use edge_gateway::http::GatewayServer;
use edge_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Edge API gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_filter);

    tracing::info!("edge-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_per_minute = config.rate_limit.per_minute,
        request_timeout_secs = config.timeouts.request_secs,
        stub_mode = config.stub_mode,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = GatewayServer::new(config);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
