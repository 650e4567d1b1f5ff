//! # REST API 클라이언트 모듈
//!
//! 백엔드 엔드포인트를 타입이 있는 함수로 감싼 계층입니다.
//! 캐시나 재시도는 여기서 하지 않습니다 (`workspace` 모듈의 역할).
//!
//! 각 하위 모듈:
//! - `client`: 공통 HTTP 처리 (URL 조합, 인증 헤더, 응답/에러 변환)
//! - `endpoints`: 엔드포인트 경로
//! - `token`: Bearer 토큰 보관소 (메모리 / 파일)
//! - `auth`: 회원가입, 로그인, 로그아웃, 내 정보
//! - `documents`: 문서 CRUD, AI 생성/수정/감사, 버전 조회
//! - `embeddings`: 임베딩 생성, 검색, 조회, 삭제

pub mod auth;
pub mod client;
pub mod documents;
pub mod embeddings;
pub mod endpoints;
pub mod token;

pub use client::ApiClient;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
