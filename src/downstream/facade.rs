//! Outbound call facade for downstream services.
//!
//! # Responsibilities
//! - Resolve the final URL from the configured base and a relative path
//! - Build outbound headers from the current request context
//! - Execute one attempt under the configured timeout
//! - Map status and transport failures to the gateway error taxonomy
//!
//! # Design Decisions
//! - A call moves through URL resolution → header construction → flight →
//!   exactly one terminal outcome; a missing base URL fails before any
//!   header or network work
//! - The base URL is authoritative for scheme and host; the relative path
//!   is appended to the base path and cannot escape it
//! - No retries; upstream status codes are never reinterpreted

use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use reqwest::multipart;
use reqwest::{Client, Response};
use url::Url;

use crate::context::{
    self, TENANT_ID_HEADER, TRACE_ID_HEADER, USER_ID_HEADER, USER_ROLES_HEADER,
};
use crate::error::GatewayError;
use crate::observability::metrics;

/// File payload for multipart calls.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Body shape of one outbound call.
#[derive(Debug, Clone, Default)]
pub enum CallBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart {
        fields: Vec<(String, String)>,
        file: FilePart,
    },
}

/// One outbound call; ephemeral, carries no cross-call state.
#[derive(Debug, Clone)]
pub struct DownstreamCallSpec {
    pub method: Method,
    pub path: String,
    pub body: CallBody,
    pub query: Vec<(String, String)>,
    pub extra_headers: Vec<(String, String)>,
}

impl DownstreamCallSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: CallBody::Empty,
            query: Vec::new(),
            extra_headers: Vec::new(),
        }
    }

    pub fn post_json(path: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: CallBody::Json(payload),
            query: Vec::new(),
            extra_headers: Vec::new(),
        }
    }

    pub fn post_multipart(
        path: impl Into<String>,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: CallBody::Multipart { fields, file },
            query: Vec::new(),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

/// Builds authenticated, traced calls toward one downstream service.
///
/// Holds only immutable configuration and the shared pooling client; safe
/// to share across concurrent chains.
pub struct DownstreamFacade {
    client: Client,
    service_name: String,
    base_url: Option<Url>,
    timeout: Duration,
}

impl DownstreamFacade {
    pub fn new(
        client: Client,
        service_name: impl Into<String>,
        base_url: Option<Url>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            service_name: service_name.into(),
            base_url,
            timeout,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Execute one outbound call.
    pub async fn request(&self, spec: DownstreamCallSpec) -> Result<Response, GatewayError> {
        let url = self.build_url(&spec.path)?;
        let headers = build_headers(&spec.extra_headers);

        let mut request = self
            .client
            .request(spec.method, url)
            .headers(headers)
            .timeout(self.timeout);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        request = match spec.body {
            CallBody::Empty => request,
            CallBody::Json(payload) => request.json(&payload),
            CallBody::Form(fields) => request.form(&fields),
            CallBody::Multipart { fields, file } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                let part = multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|err| GatewayError::UpstreamUnavailable {
                        service: self.service_name.clone(),
                        message: format!("invalid upload content type: {err}"),
                    })?;
                request.multipart(form.part(file.field_name, part))
            }
        };

        let response = request.send().await.map_err(|err| {
            metrics::record_upstream_failure(&self.service_name, "transport");
            tracing::warn!(service = %self.service_name, error = %err, "downstream unreachable");
            GatewayError::UpstreamUnavailable {
                service: self.service_name.clone(),
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("upstream rejected the request")
                        .to_string()
                });
            metrics::record_upstream_failure(&self.service_name, "rejected");
            tracing::warn!(service = %self.service_name, status = %status, "downstream rejected the call");
            return Err(GatewayError::UpstreamRejected {
                service: self.service_name.clone(),
                status,
                message,
            });
        }

        Ok(response)
    }

    /// Execute a call and decode the JSON response body.
    ///
    /// A body that fails to decode is this facade's own failure mode and
    /// surfaces as UpstreamUnavailable.
    pub async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        spec: DownstreamCallSpec,
    ) -> Result<T, GatewayError> {
        let response = self.request(spec).await?;
        response
            .json()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                service: self.service_name.clone(),
                message: format!("invalid response body: {err}"),
            })
    }

    fn build_url(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| GatewayError::NotConfigured {
                service: self.service_name.clone(),
            })?;

        let mut url = base.clone();
        let joined = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        Ok(url)
    }
}

/// Outbound headers derived from the current request context.
///
/// Call-specific extras are merged last and win on key collision.
fn build_headers(extra: &[(String, String)]) -> HeaderMap {
    let ctx = context::current();
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(&ctx.trace_id) {
        headers.insert(TRACE_ID_HEADER, value);
    }
    if let Some(tenant) = &ctx.tenant_id {
        if let Ok(value) = HeaderValue::from_str(tenant) {
            headers.insert(TENANT_ID_HEADER, value);
        }
    }
    if let Some(principal) = &ctx.principal {
        if let Ok(value) = HeaderValue::from_str(&principal.user_id) {
            headers.insert(USER_ID_HEADER, value);
        }
        if !principal.roles.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&principal.roles.join(",")) {
                headers.insert(USER_ROLES_HEADER, value);
            }
        }
    }

    for (name, value) in extra {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    headers
}
