//! Wire schemas for the gateway's public API.

use serde::{Deserialize, Serialize};

use crate::context::Principal;

/// Authenticated caller profile returned by `/api/v1/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub tenant_id: String,
}

impl From<Principal> for UserProfile {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.user_id,
            username: principal.username,
            display_name: principal.display_name,
            roles: principal.roles,
            tenant_id: principal.tenant_id,
        }
    }
}

/// One document in a listing. Timestamps pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentItem {
    pub doc_id: String,
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Full document record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub item: DocumentItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<serde_json::Value>>,
}

/// Acknowledgement for an accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUploadResponse {
    pub doc_id: String,
    pub status: String,
}

/// Conversation hints forwarded to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssistantContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Caller query for the assistant endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantQueryRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub context: Option<AssistantContext>,
}

fn default_language() -> String {
    "ru".to_string()
}

/// One source document backing an assistant answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSource {
    pub doc_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<i64>,
}

/// Answer metadata; always carries the trace id for correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<serde_json::Value>,
}

/// Assistant answer passed through from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<AssistantSource>,
    pub meta: AssistantResponseMeta,
}

/// Verdict returned by the content-safety evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    /// "allowed" or "blocked".
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyCheckResult {
    /// Anything other than an explicit "allowed" is treated as blocked.
    pub fn blocked(&self) -> bool {
        self.status != "allowed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_verdict_fails_closed() {
        let allowed = SafetyCheckResult {
            status: "allowed".into(),
            reason: None,
        };
        assert!(!allowed.blocked());

        let blocked = SafetyCheckResult {
            status: "blocked".into(),
            reason: Some("policy".into()),
        };
        assert!(blocked.blocked());

        let unknown = SafetyCheckResult {
            status: "maybe".into(),
            reason: None,
        };
        assert!(unknown.blocked());
    }

    #[test]
    fn assistant_request_defaults_the_language() {
        let request: AssistantQueryRequest =
            serde_json::from_str(r#"{"query": "hello"}"#).unwrap();
        assert_eq!(request.language, "ru");
        assert!(request.context.is_none());
    }
}
