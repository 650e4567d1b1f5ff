//! # 데이터 모델 모듈
//!
//! 백엔드 API가 주고받는 JSON 구조체들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `document`: 문서(Document)와 생성/수정/AI 생성/감사 요청
//! - `embedding`: 임베딩 생성·검색·삭제 요청과 응답
//! - `user`: 사용자(User), 로그인/회원가입 요청과 토큰 응답
//! - `version`: 문서 버전(DocumentVersion)
//! - `timestamp`: 백엔드 시각 문자열을 `DateTime<Utc>`로 해석하는 serde 도우미

pub mod document;
pub mod embedding;
pub mod timestamp;
pub mod user;
pub mod version;

pub use document::*;
pub use embedding::*;
pub use user::*;
pub use version::*;
