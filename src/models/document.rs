use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub doc_type: String,
    pub created_by: String,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreate {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

/// 부분 수정 요청. `None`인 필드는 본문에서 빠지므로 서버가 변경하지 않습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentGenerateRequest {
    pub title: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_doc_ids: Option<Vec<String>>,
}

/// 유지보수 에이전트에게 문서의 한 섹션을 고쳐 쓰도록 요청합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpdateWithAgentRequest {
    pub doc_id: String,
    pub section: String,
    pub new_content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAuditRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_consistency: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_completeness: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_accuracy: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: AuditSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditResults {
    #[serde(default)]
    pub issues: Vec<AuditIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// 에이전트가 추가로 내려주는 필드
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAuditResponse {
    pub doc_id: String,
    pub audit_results: AuditResults,
    pub message: String,
}

/// `GET /api/documents`의 페이지 파라미터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ListDocumentsParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}
