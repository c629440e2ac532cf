//! Route handlers.
//!
//! Thin orchestration only: each endpoint sequences
//! authenticate → rate-limit check → downstream call(s). Failures already
//! shaped as [`GatewayError`] pass through unchanged; the handlers
//! introduce no failure modes of their own beyond multipart parsing.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::context::{self, Principal};
use crate::downstream::documents::DocumentFilters;
use crate::downstream::facade::FilePart;
use crate::downstream::ingestion::UploadMetadata;
use crate::error::{ErrorBody, GatewayError};
use crate::http::schemas::{
    AssistantQueryRequest, AssistantResponse, DocumentDetail, DocumentItem, UserProfile,
};
use crate::http::server::AppState;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// `GET /api/v1/auth/me`
pub async fn read_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, GatewayError> {
    let principal = state.auth.authenticate(&headers).await?;
    Ok(Json(UserProfile::from(principal)))
}

/// `GET /api/v1/documents`
pub async fn list_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<DocumentFilters>,
) -> Result<Json<Vec<DocumentItem>>, GatewayError> {
    let principal = state.auth.authenticate(&headers).await?;
    state.limiter.check(&rate_key("doc-list", &principal)).await?;

    let documents = state.documents.list(&principal.tenant_id, &filters).await?;
    Ok(Json(documents))
}

/// `GET /api/v1/documents/{doc_id}`
pub async fn get_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DocumentDetail>, GatewayError> {
    let principal = state.auth.authenticate(&headers).await?;
    state
        .limiter
        .check(&rate_key("doc-detail", &principal))
        .await?;

    let document = state.documents.fetch(&doc_id).await?;
    Ok(Json(document))
}

/// `POST /api/v1/documents/upload`
pub async fn upload_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let principal = match state.auth.authenticate(&headers).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = state
        .limiter
        .check(&rate_key("doc-upload", &principal))
        .await
    {
        return err.into_response();
    }

    let (metadata, file) = match read_upload(multipart, &principal.tenant_id).await {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    match state.ingestion.enqueue(metadata, file).await {
        Ok(accepted) => (StatusCode::ACCEPTED, Json(accepted)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `POST /api/v1/assistant/query`
pub async fn assistant_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AssistantQueryRequest>,
) -> Result<Json<AssistantResponse>, GatewayError> {
    let principal = state.auth.authenticate(&headers).await?;
    state
        .limiter
        .check(&rate_key("assistant", &principal))
        .await?;

    let ctx = context::current();
    let verdict = state
        .safety
        .check_input(json!({
            "query": request.query,
            "language": request.language,
            "tenant_id": principal.tenant_id,
            "trace_id": ctx.trace_id,
        }))
        .await?;
    if verdict.blocked() {
        return Err(GatewayError::Unauthorized {
            message: verdict
                .reason
                .clone()
                .unwrap_or_else(|| "query blocked by safety policy".to_string()),
        });
    }

    let mut answer = state
        .orchestrator
        .query(json!({
            "query": request.query,
            "language": request.language,
            "context": request.context,
            "tenant_id": principal.tenant_id,
            "user_id": principal.user_id,
            "trace_id": ctx.trace_id,
        }))
        .await?;
    if answer.meta.safety.is_none() {
        answer.meta.safety = Some(json!({
            "status": verdict.status,
            "reason": verdict.reason,
        }));
    }
    Ok(Json(answer))
}

/// Quota key for one operation and caller.
fn rate_key(operation: &str, principal: &Principal) -> String {
    format!(
        "{operation}:{}:{}",
        principal.tenant_id, principal.user_id
    )
}

/// Read the multipart upload into metadata fields and the file part.
async fn read_upload(
    mut multipart: Multipart,
    tenant_id: &str,
) -> Result<(UploadMetadata, FilePart), Response> {
    let mut metadata = UploadMetadata {
        tenant_id: tenant_id.to_string(),
        ..UploadMetadata::default()
    };
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(invalid_request(format!("malformed multipart body: {err}"))),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        return Err(invalid_request(format!("failed to read upload: {err}")))
                    }
                };
                file = Some(FilePart {
                    field_name: "file".to_string(),
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "product" => metadata.product = text_field(field).await?,
            "version" => metadata.version = text_field(field).await?,
            "tags" => metadata.tags = text_field(field).await?,
            _ => {}
        }
    }

    let Some(file) = file else {
        return Err(invalid_request("missing file field"));
    };
    Ok((metadata, file))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, Response> {
    match field.text().await {
        Ok(text) if text.is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(err) => Err(invalid_request(format!("failed to read form field: {err}"))),
    }
}

/// Client-side request defects (not part of the gateway taxonomy).
fn invalid_request(message: impl Into<String>) -> Response {
    let body = ErrorBody {
        code: "invalid_request",
        message: message.into(),
        trace_id: context::try_current().map(|ctx| ctx.trace_id),
        retry_after: None,
        details: None,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_keys_are_scoped_per_operation_and_caller() {
        let principal = Principal {
            user_id: "user-123".into(),
            username: "demo".into(),
            tenant_id: "tenant-456".into(),
            roles: vec![],
            display_name: None,
        };
        assert_eq!(
            rate_key("doc-upload", &principal),
            "doc-upload:tenant-456:user-123"
        );
    }
}
