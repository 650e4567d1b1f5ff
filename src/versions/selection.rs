//! # 비교 대상 선택
//!
//! 기본 선택 규칙:
//! - 버전 0개: 선택 없음 (화면은 빈 상태 안내를 보여줌)
//! - 버전 1개: `from = to =` 그 버전 (자기 자신과 비교 → 전부 `Unchanged`)
//! - 버전 2개 이상: `to` = 가장 높은 번호, `from` = 두 번째로 높은 번호
//!
//! 사용자가 한쪽을 직접 고르면 그 값은 다시 바꾸거나 문서를 바꿀 때까지 유지됩니다.

use serde::Serialize;

use crate::models::DocumentVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VersionSelection {
    pub from: i64,
    pub to: i64,
}

impl VersionSelection {
    pub fn is_self_comparison(&self) -> bool {
        self.from == self.to
    }
}

/// 버전 목록에서 기본 비교 대상을 고릅니다.
///
/// 목록이 최신순이라고 가정하지 않고 번호로 다시 정렬합니다.
pub fn default_selection(versions: &[DocumentVersion]) -> Option<VersionSelection> {
    default_selection_for(versions.iter().map(|v| v.version_number))
}

pub fn default_selection_for<I>(version_numbers: I) -> Option<VersionSelection>
where
    I: IntoIterator<Item = i64>,
{
    let mut numbers: Vec<i64> = version_numbers.into_iter().collect();
    numbers.sort_unstable_by(|a, b| b.cmp(a));
    numbers.dedup();

    match numbers.as_slice() {
        [] => None,
        [only] => Some(VersionSelection {
            from: *only,
            to: *only,
        }),
        [latest, previous, ..] => Some(VersionSelection {
            from: *previous,
            to: *latest,
        }),
    }
}

/// 문서별로 사용자가 직접 고른 값을 기억합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    document_id: Option<String>,
    from: Option<i64>,
    to: Option<i64>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// 다른 문서를 고르면 직접 고른 값을 모두 버립니다.
    /// 같은 문서를 다시 고르면 그대로 유지하고 `false`를 돌려줍니다.
    pub fn select_document(&mut self, document_id: &str) -> bool {
        if self.document_id.as_deref() == Some(document_id) {
            return false;
        }
        *self = Self {
            document_id: Some(document_id.to_string()),
            from: None,
            to: None,
        };
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn pick_from(&mut self, version_number: i64) {
        self.from = Some(version_number);
    }

    pub fn pick_to(&mut self, version_number: i64) {
        self.to = Some(version_number);
    }

    /// 기본 선택 위에 직접 고른 값을 덮어씁니다.
    ///
    /// 버전이 하나도 없으면 직접 고른 값이 있어도 `None`입니다.
    /// 직접 고른 번호가 목록에 없을 수도 있습니다. 확인은 호출하는 쪽에서 합니다.
    pub fn resolve(&self, versions: &[DocumentVersion]) -> Option<VersionSelection> {
        let default = default_selection(versions)?;
        Some(VersionSelection {
            from: self.from.unwrap_or(default.from),
            to: self.to.unwrap_or(default.to),
        })
    }
}
