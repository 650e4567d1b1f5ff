//! # 비교 결과 → 화면용 뷰 모델
//!
//! 비교 결과를 두 개의 나란한 패널로 바꿉니다. 부수 효과가 없는 순수 변환입니다.
//!
//! - 두 패널은 항상 같은 행 수(`max_lines`)를 가집니다.
//!   해당 쪽에 줄이 없는 행은 `present: false`로 표시됩니다.
//! - 빈 줄은 `EMPTY_LINE_PLACEHOLDER`(줄바꿈 없는 공백)로 바꿔 화면에서 사라지지 않게 합니다.
//! - 색상 분류: `Unchanged → Neutral`, to쪽 `Added/Changed → Positive`,
//!   from쪽 `Removed → Negative`, from쪽 `Changed → Warning`

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::diff::{ComparisonResult, DiffStats, LineChange};
use crate::models::DocumentVersion;

pub const EMPTY_LINE_PLACEHOLDER: &str = "\u{00A0}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTone {
    Neutral,
    Positive,
    Negative,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRow {
    pub index: usize,
    /// 화면에 표시할 텍스트 (빈 줄/없는 줄은 자리표시 문자)
    pub text: String,
    pub change: LineChange,
    pub tone: LineTone,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub side: Side,
    pub title: &'static str,
    pub version_number: i64,
    /// 예: "v3"
    pub badge: String,
    pub rows: Vec<PanelRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub from: Panel,
    pub to: Panel,
    pub stats: DiffStats,
}

impl ViewModel {
    /// 두 패널의 행을 같은 인덱스끼리 묶어 순회합니다.
    pub fn paired_rows(&self) -> impl Iterator<Item = (&PanelRow, &PanelRow)> {
        self.from.rows.iter().zip(&self.to.rows)
    }
}

/// 줄 분류 → 색상 분류
pub fn tone(side: Side, change: LineChange) -> LineTone {
    match (side, change) {
        (_, LineChange::Unchanged) => LineTone::Neutral,
        (Side::To, LineChange::Added | LineChange::Changed) => LineTone::Positive,
        (Side::From, LineChange::Changed) => LineTone::Warning,
        (Side::From, LineChange::Removed) => LineTone::Negative,
        // classify_from은 Added를, classify_to는 Removed를 만들지 않으므로 올 수 없는 조합.
        // match를 빠짐없이 채우려고 둔 분기입니다.
        (Side::From, LineChange::Added) => LineTone::Positive,
        (Side::To, LineChange::Removed) => LineTone::Negative,
    }
}

pub fn present(comparison: &ComparisonResult, from_version: i64, to_version: i64) -> ViewModel {
    ViewModel {
        from: panel(
            Side::From,
            "From Version",
            from_version,
            &comparison.from_lines,
            &comparison.from_changes,
        ),
        to: panel(
            Side::To,
            "To Version",
            to_version,
            &comparison.to_lines,
            &comparison.to_changes,
        ),
        stats: comparison.stats(),
    }
}

fn panel(
    side: Side,
    title: &'static str,
    version_number: i64,
    lines: &[String],
    changes: &[LineChange],
) -> Panel {
    let rows = changes
        .iter()
        .enumerate()
        .map(|(index, change)| {
            let line = lines.get(index);
            PanelRow {
                index,
                text: match line {
                    Some(text) if !text.is_empty() => text.clone(),
                    _ => EMPTY_LINE_PLACEHOLDER.to_string(),
                },
                change: *change,
                tone: tone(side, *change),
                present: line.is_some(),
            }
        })
        .collect();

    Panel {
        side,
        title,
        version_number,
        badge: format!("v{}", version_number),
        rows,
    }
}

/// 버전 타임라인의 한 항목 (선택 상자 항목과 "Updated 3h ago" 표시)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub version_number: i64,
    pub label: String,
    pub updated: String,
    pub updated_by: String,
    pub is_latest: bool,
}

/// "v3 - Added rate limit docs" 또는 요약이 없으면 "v3"
pub fn version_label(version: &DocumentVersion) -> String {
    match version.diff.as_deref().map(str::trim) {
        Some(summary) if !summary.is_empty() => {
            format!("v{} - {}", version.version_number, summary)
        }
        _ => format!("v{}", version.version_number),
    }
}

/// 최신 버전이 먼저 오도록 정렬한 타임라인
pub fn timeline(versions: &[DocumentVersion], now: DateTime<Utc>) -> Vec<TimelineEntry> {
    let mut sorted: Vec<&DocumentVersion> = versions.iter().collect();
    sorted.sort_by(|a, b| b.version_number.cmp(&a.version_number));

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, version)| TimelineEntry {
            version_number: version.version_number,
            label: version_label(version),
            updated: format!("Updated {}", relative_age(version.timestamp, now)),
            updated_by: version.updated_by.clone(),
            is_latest: i == 0,
        })
        .collect()
}

/// 지금으로부터 얼마나 지났는지: "just now", "5m ago", "3h ago", "2d ago"
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
