//! Token introspection backends.
//!
//! The live backend POSTs the credential to the identity provider; the
//! static backend answers deterministically without network I/O and is
//! selected when no introspection endpoint is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::context::Principal;
use crate::error::GatewayError;

/// Fallback username when the provider supplies none.
const DEFAULT_USERNAME: &str = "user";
/// Fallback tenant when the provider supplies none.
const DEFAULT_TENANT: &str = "unknown";

/// Validates an opaque bearer credential and yields the claims it carries.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<Principal, GatewayError>;
}

/// Offline introspector returning a fixed principal for any token.
pub struct StaticIntrospector;

#[async_trait]
impl TokenIntrospector for StaticIntrospector {
    async fn introspect(&self, _token: &str) -> Result<Principal, GatewayError> {
        Ok(Principal {
            user_id: "demo".to_string(),
            username: "demo".to_string(),
            tenant_id: "demo".to_string(),
            roles: vec!["admin".to_string()],
            display_name: None,
        })
    }
}

/// Live introspector calling the identity provider over HTTP.
pub struct HttpIntrospector {
    client: reqwest::Client,
    endpoint: Url,
    audience: Option<String>,
    timeout: Duration,
}

impl HttpIntrospector {
    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        audience: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint,
            audience,
            timeout,
        }
    }
}

/// Wire shape of the provider's introspection response.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    sub: String,
    username: Option<String>,
    preferred_username: Option<String>,
    tenant_id: Option<String>,
    tenant: Option<String>,
    roles: Option<Vec<String>>,
    name: Option<String>,
}

fn default_active() -> bool {
    true
}

#[async_trait]
impl TokenIntrospector for HttpIntrospector {
    async fn introspect(&self, token: &str) -> Result<Principal, GatewayError> {
        let mut form = vec![("token", token.to_string())];
        if let Some(audience) = &self.audience {
            form.push(("audience", audience.clone()));
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                service: "auth".to_string(),
                message: format!("auth provider unavailable: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unauthenticated {
                status,
                message: "invalid token".to_string(),
            });
        }

        let payload: IntrospectionResponse =
            response
                .json()
                .await
                .map_err(|err| GatewayError::UpstreamUnavailable {
                    service: "auth".to_string(),
                    message: format!("invalid introspection response: {err}"),
                })?;

        if !payload.active {
            return Err(GatewayError::unauthenticated("token inactive"));
        }

        Ok(Principal {
            user_id: payload.sub,
            username: first_non_empty(payload.username, payload.preferred_username)
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            tenant_id: first_non_empty(payload.tenant_id, payload.tenant)
                .unwrap_or_else(|| DEFAULT_TENANT.to_string()),
            roles: payload.roles.unwrap_or_default(),
            display_name: payload.name,
        })
    }
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.filter(|v| !v.is_empty()))
}
