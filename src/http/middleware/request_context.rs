//! Per-request context initialization.
//!
//! # Responsibilities
//! - Extract the inbound trace and tenant headers
//! - Run the whole handling chain inside a request-context scope
//! - Echo the trace id (and tenant, when known) back to the caller
//! - Record the request in the metrics pipeline

use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::{self, RequestContext, TENANT_ID_HEADER, TRACE_ID_HEADER};
use crate::observability::metrics;

/// Wrap request handling in a fresh request-context scope.
///
/// The scope is torn down when handling completes on any path; the echoed
/// headers reflect the context as it stood at the end of the chain, so a
/// tenant learned during authentication is included.
pub async fn request_context_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let trace_id = header_value(&request, &TRACE_ID_HEADER);
    let tenant_id = header_value(&request, &TENANT_ID_HEADER);
    let ctx = RequestContext::new(trace_id, tenant_id);

    let response = context::scope(ctx, async move {
        let mut response = next.run(request).await;

        let ctx = context::current();
        if let Ok(value) = HeaderValue::from_str(&ctx.trace_id) {
            response.headers_mut().insert(TRACE_ID_HEADER, value);
        }
        if let Some(tenant) = &ctx.tenant_id {
            if let Ok(value) = HeaderValue::from_str(tenant) {
                response.headers_mut().insert(TENANT_ID_HEADER, value);
            }
        }
        response
    })
    .await;

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

fn header_value(request: &Request<Body>, name: &HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .filter(|v| !v.is_empty())
}
