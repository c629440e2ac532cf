//! Edge API Gateway Library

pub mod auth;
pub mod config;
pub mod context;
pub mod downstream;
pub mod error;
pub mod http;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::GatewayServer;
