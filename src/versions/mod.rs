//! # 버전 비교(diff) 모듈
//!
//! 문서의 두 버전을 골라 줄 단위로 비교하고, 나란히 보여줄 뷰 모델을 만듭니다.
//!
//! 흐름: 문서 선택 → 버전 목록 조회 → 비교할 두 버전 결정 → 두 스냅샷 조회
//! → `diff::compare()` → `presenter::present()`
//!
//! 각 하위 모듈:
//! - `repository`: 버전 목록/스냅샷을 제공하는 `VersionRepository` 트레이트
//! - `diff`: 위치 기반 줄 비교
//! - `selection`: 기본 비교 대상 선택과 사용자 지정 유지
//! - `presenter`: 비교 결과 → 화면용 뷰 모델, 버전 타임라인
//! - `session`: 화면 상태 머신 (오래된 응답 폐기, 취소 포함)

pub mod diff;
pub mod presenter;
pub mod repository;
pub mod selection;
pub mod session;

pub use diff::{compare, compare_versions, ComparisonResult, DiffLine, DiffStats, LineChange};
pub use presenter::{present, timeline, LineTone, Panel, PanelRow, Side, TimelineEntry, ViewModel};
pub use repository::VersionRepository;
pub use selection::{default_selection, Selector, VersionSelection};
pub use session::{
    ApplyOutcome, ComparisonSession, ComparisonTicket, FetchTicket, LoadStage, PendingLoad, ViewState,
};
