//! # 위치 기반 줄 비교
//!
//! 두 내용을 `\n`으로 나눈 뒤 **같은 인덱스의 줄끼리** 비교합니다.
//! 최소 편집 거리(LCS) 알고리즘이 아니므로, 중간에 한 줄을 끼워 넣으면
//! 그 아래 모든 줄이 `Changed`로 표시됩니다. 시간/공간 모두 O(max_lines)입니다.
//!
//! 분류 규칙 (인덱스 `i`, 두 쪽 모두 `0..max_lines` 범위를 분류):
//!
//! | 쪽   | 조건                                   | 분류        |
//! |------|----------------------------------------|-------------|
//! | from | `i >= from.len()`                      | `Removed`   |
//! | from | `i >= to.len()` 또는 두 줄이 다름      | `Changed`   |
//! | to   | `i >= to.len()` 또는 `i >= from.len()` | `Added`     |
//! | to   | 두 줄이 다름                           | `Changed`   |
//! | 둘 다| 그 밖의 경우                           | `Unchanged` |
//!
//! 비교는 대소문자와 공백을 그대로 구분하는 단순 문자열 비교입니다.

use serde::Serialize;

use crate::models::DocumentVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineChange {
    Unchanged,
    Added,
    Removed,
    Changed,
}

/// 한쪽 패널의 한 줄. 그쪽에 해당 인덱스의 줄이 없으면 `text`는 `None`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub index: usize,
    pub text: Option<String>,
    pub change: LineChange,
}

/// 두 내용의 비교 결과. 한 번 그릴 때 만들고 선택이 바뀌면 버립니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub from_version: Option<i64>,
    pub to_version: Option<i64>,
    /// `from` 내용을 `\n`으로 나눈 줄 (빈 문자열이면 빈 줄 하나)
    pub from_lines: Vec<String>,
    pub to_lines: Vec<String>,
    /// 인덱스별 분류. 길이는 `max_lines()`
    pub from_changes: Vec<LineChange>,
    pub to_changes: Vec<LineChange>,
}

/// 인덱스(행) 단위 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub rows: usize,
    pub unchanged: usize,
    /// 두 쪽 모두 줄이 있지만 내용이 다름
    pub changed: usize,
    /// `to`에만 줄이 있음
    pub added: usize,
    /// `from`에만 줄이 있음
    pub removed: usize,
}

/// 두 내용을 위치 기반으로 비교합니다. 실패하지 않는 순수 함수입니다.
pub fn compare(from_content: &str, to_content: &str) -> ComparisonResult {
    let from_lines = split_lines(from_content);
    let to_lines = split_lines(to_content);
    let max_lines = from_lines.len().max(to_lines.len());

    let from_changes = (0..max_lines)
        .map(|i| classify_from(i, &from_lines, &to_lines))
        .collect();
    let to_changes = (0..max_lines)
        .map(|i| classify_to(i, &from_lines, &to_lines))
        .collect();

    ComparisonResult {
        from_version: None,
        to_version: None,
        from_lines,
        to_lines,
        from_changes,
        to_changes,
    }
}

/// 두 버전 스냅샷을 비교합니다. 결과에 버전 번호가 함께 기록됩니다.
pub fn compare_versions(from: &DocumentVersion, to: &DocumentVersion) -> ComparisonResult {
    ComparisonResult {
        from_version: Some(from.version_number),
        to_version: Some(to.version_number),
        ..compare(&from.content, &to.content)
    }
}

// JavaScript의 split("\n")과 같이, 빈 문자열도 빈 줄 하나로 나눕니다.
fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_string).collect()
}

fn classify_from(index: usize, from: &[String], to: &[String]) -> LineChange {
    if index >= from.len() {
        LineChange::Removed
    } else if index >= to.len() || from[index] != to[index] {
        LineChange::Changed
    } else {
        LineChange::Unchanged
    }
}

fn classify_to(index: usize, from: &[String], to: &[String]) -> LineChange {
    if index >= to.len() || index >= from.len() {
        LineChange::Added
    } else if from[index] != to[index] {
        LineChange::Changed
    } else {
        LineChange::Unchanged
    }
}

impl ComparisonResult {
    pub fn max_lines(&self) -> usize {
        self.from_changes.len()
    }

    pub fn is_identical(&self) -> bool {
        self.from_changes
            .iter()
            .chain(&self.to_changes)
            .all(|c| *c == LineChange::Unchanged)
    }

    pub fn from_rows(&self) -> Vec<DiffLine> {
        rows(&self.from_lines, &self.from_changes)
    }

    pub fn to_rows(&self) -> Vec<DiffLine> {
        rows(&self.to_lines, &self.to_changes)
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats {
            rows: self.max_lines(),
            ..DiffStats::default()
        };
        for i in 0..stats.rows {
            match (self.from_lines.get(i), self.to_lines.get(i)) {
                (Some(a), Some(b)) if a == b => stats.unchanged += 1,
                (Some(_), Some(_)) => stats.changed += 1,
                (None, Some(_)) => stats.added += 1,
                (Some(_), None) => stats.removed += 1,
                (None, None) => {}
            }
        }
        stats
    }
}

fn rows(lines: &[String], changes: &[LineChange]) -> Vec<DiffLine> {
    changes
        .iter()
        .enumerate()
        .map(|(index, change)| DiffLine {
            index,
            text: lines.get(index).cloned(),
            change: *change,
        })
        .collect()
}
