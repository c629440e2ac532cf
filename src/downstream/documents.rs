//! Document catalog client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::downstream::facade::{DownstreamCallSpec, DownstreamFacade};
use crate::error::GatewayError;
use crate::http::schemas::{DocumentDetail, DocumentItem};

/// Filters accepted by the document listing endpoint.
///
/// Doubles as the query extractor for the inbound route; empty values are
/// dropped before the downstream call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilters {
    pub status: Option<String>,
    pub product: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// Read access to the document catalog.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(
        &self,
        tenant_id: &str,
        filters: &DocumentFilters,
    ) -> Result<Vec<DocumentItem>, GatewayError>;

    async fn fetch(&self, doc_id: &str) -> Result<DocumentDetail, GatewayError>;
}

/// Live client backed by the documents service.
pub struct HttpDocumentStore {
    facade: DownstreamFacade,
}

impl HttpDocumentStore {
    pub fn new(facade: DownstreamFacade) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list(
        &self,
        tenant_id: &str,
        filters: &DocumentFilters,
    ) -> Result<Vec<DocumentItem>, GatewayError> {
        let mut query = vec![("tenant_id".to_string(), tenant_id.to_string())];
        for (name, value) in [
            ("status", &filters.status),
            ("product", &filters.product),
            ("tag", &filters.tag),
            ("search", &filters.search),
        ] {
            if let Some(value) = value {
                if !value.is_empty() {
                    query.push((name.to_string(), value.clone()));
                }
            }
        }

        self.facade
            .request_json(DownstreamCallSpec::get("internal/documents/list").with_query(query))
            .await
    }

    async fn fetch(&self, doc_id: &str) -> Result<DocumentDetail, GatewayError> {
        self.facade
            .request_json(DownstreamCallSpec::get(format!(
                "internal/documents/{doc_id}"
            )))
            .await
    }
}

/// Deterministic stand-in used when the catalog is stubbed.
pub struct StubDocumentStore;

#[async_trait]
impl DocumentStore for StubDocumentStore {
    async fn list(
        &self,
        _tenant_id: &str,
        _filters: &DocumentFilters,
    ) -> Result<Vec<DocumentItem>, GatewayError> {
        Ok(Vec::new())
    }

    async fn fetch(&self, doc_id: &str) -> Result<DocumentDetail, GatewayError> {
        Ok(DocumentDetail {
            item: DocumentItem {
                doc_id: doc_id.to_string(),
                status: "unknown".to_string(),
                ..DocumentItem::default()
            },
            ..DocumentDetail::default()
        })
    }
}
