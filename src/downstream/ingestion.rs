//! Document ingestion client.

use async_trait::async_trait;
use uuid::Uuid;

use crate::downstream::facade::{DownstreamCallSpec, DownstreamFacade, FilePart};
use crate::error::GatewayError;
use crate::http::schemas::DocumentUploadResponse;

/// Metadata accompanying an uploaded document.
#[derive(Debug, Clone, Default)]
pub struct UploadMetadata {
    pub tenant_id: String,
    pub product: Option<String>,
    pub version: Option<String>,
    pub tags: Option<String>,
}

/// Hands uploaded documents to the ingestion pipeline.
#[async_trait]
pub trait IngestionQueue: Send + Sync {
    async fn enqueue(
        &self,
        metadata: UploadMetadata,
        file: FilePart,
    ) -> Result<DocumentUploadResponse, GatewayError>;
}

/// Live client backed by the ingestion service.
pub struct HttpIngestionQueue {
    facade: DownstreamFacade,
}

impl HttpIngestionQueue {
    pub fn new(facade: DownstreamFacade) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl IngestionQueue for HttpIngestionQueue {
    async fn enqueue(
        &self,
        metadata: UploadMetadata,
        file: FilePart,
    ) -> Result<DocumentUploadResponse, GatewayError> {
        let mut fields = vec![("tenant_id".to_string(), metadata.tenant_id)];
        for (name, value) in [
            ("product", metadata.product),
            ("version", metadata.version),
            ("tags", metadata.tags),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.push((name.to_string(), value));
            }
        }

        self.facade
            .request_json(DownstreamCallSpec::post_multipart(
                "internal/ingestion/enqueue",
                fields,
                file,
            ))
            .await
    }
}

/// Deterministic stand-in used when ingestion is stubbed.
pub struct StubIngestionQueue;

#[async_trait]
impl IngestionQueue for StubIngestionQueue {
    async fn enqueue(
        &self,
        _metadata: UploadMetadata,
        _file: FilePart,
    ) -> Result<DocumentUploadResponse, GatewayError> {
        let mut suffix = Uuid::new_v4().simple().to_string();
        suffix.truncate(8);
        Ok(DocumentUploadResponse {
            doc_id: format!("stub_{suffix}"),
            status: "uploaded".to_string(),
        })
    }
}
