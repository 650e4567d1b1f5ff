use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 문서 내용의 불변 스냅샷. 같은 문서 안에서 `version_number`는 1부터 증가하며 중복되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: String,
    pub doc_id: String,
    pub version_number: i64,
    pub content: String,
    /// 사람이 읽을 수 있는 변경 요약 (예: "Added rate limit docs")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    pub updated_by: String,
    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}
