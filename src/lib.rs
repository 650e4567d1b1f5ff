//! # docspace 클라이언트 라이브러리
//!
//! 문서 워크스페이스 백엔드를 호출하는 클라이언트와 버전 비교 기능을 제공합니다.
//!
//! 계층 구조:
//! - `config`, `error`: 설정과 에러 타입
//! - `models`: API 요청/응답 데이터 구조
//! - `api`: 엔드포인트별 HTTP 호출 (캐시/재시도 없음)
//! - `cache`, `retry`: 조회 결과 캐시와 재시도 정책
//! - `workspace`: 위 계층을 묶은 진입점
//! - `versions`: 버전 비교(diff)와 비교 화면 상태 머신

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod versions;
pub mod workspace;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ClientError, ErrorKind};
pub use workspace::{StaleTimes, Workspace};
