//! # 클라이언트 설정(Configuration) 모듈
//!
//! 환경변수에서 클라이언트 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DOCSPACE_API_URL`: 백엔드 API 주소
//! - `DOCSPACE_TOKEN`: 미리 발급받은 Bearer 토큰 (선택)
//! - `DOCSPACE_TOKEN_PATH`: 토큰을 보관할 파일 경로 (선택)
//! - `DOCSPACE_TIMEOUT_SECS`: 요청 타임아웃
//! - `DOCSPACE_MAX_RETRIES`, `DOCSPACE_RETRY_BASE_MS`, `DOCSPACE_RETRY_MAX_MS`: 재시도 정책
//! - `DOCSPACE_*_STALE_SECS`: 캐시 항목이 "오래됨"으로 간주되기까지의 시간

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ClientError;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// 클라이언트 전체 설정을 담는 구조체
///
/// 시작 시 환경변수에서 한 번 읽어온 후, `Workspace`와 CLI가 공유합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// 백엔드 API 주소 (끝의 `/`는 제거됨)
    pub api_base_url: String,
    pub token: Option<String>,
    pub token_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// 문서 목록 캐시 유효 시간
    pub documents_stale: Duration,
    /// 단일 문서 캐시 유효 시간
    pub detail_stale: Duration,
    /// 버전 목록 캐시 유효 시간
    pub versions_stale: Duration,
    /// 개별 버전 캐시 유효 시간 (버전은 불변이므로 가장 길게)
    pub version_stale: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token: None,
            token_path: None,
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1000),
            retry_max_delay: Duration::from_millis(30_000),
            documents_stale: Duration::from_secs(120),
            detail_stale: Duration::from_secs(300),
            versions_stale: Duration::from_secs(300),
            version_stale: Duration::from_secs(600),
        }
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// 모든 항목에 기본값이 있으므로 환경변수가 하나도 없어도 동작합니다.
    /// 숫자로 해석할 수 없는 값은 기본값으로 대체합니다.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로부터 설정을 만듭니다. (테스트에서 환경변수 대신 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("DOCSPACE_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if api_base_url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "DOCSPACE_API_URL must not be empty".to_string(),
            ));
        }

        let secs = |key: &str, default: Duration| {
            Duration::from_secs(parse_or(lookup(key), default.as_secs()))
        };
        let millis = |key: &str, default: Duration| {
            Duration::from_millis(parse_or(lookup(key), default.as_millis() as u64))
        };

        Ok(Self {
            api_base_url,
            token: lookup("DOCSPACE_TOKEN").filter(|t| !t.trim().is_empty()),
            token_path: lookup("DOCSPACE_TOKEN_PATH").map(PathBuf::from),
            request_timeout: secs("DOCSPACE_TIMEOUT_SECS", defaults.request_timeout),
            max_retries: parse_or(lookup("DOCSPACE_MAX_RETRIES"), defaults.max_retries),
            retry_base_delay: millis("DOCSPACE_RETRY_BASE_MS", defaults.retry_base_delay),
            retry_max_delay: millis("DOCSPACE_RETRY_MAX_MS", defaults.retry_max_delay),
            documents_stale: secs("DOCSPACE_DOCUMENTS_STALE_SECS", defaults.documents_stale),
            detail_stale: secs("DOCSPACE_DETAIL_STALE_SECS", defaults.detail_stale),
            versions_stale: secs("DOCSPACE_VERSIONS_STALE_SECS", defaults.versions_stale),
            version_stale: secs("DOCSPACE_VERSION_STALE_SECS", defaults.version_stale),
        })
    }
}

// 값이 없으면 기본값, 파싱에 실패해도 기본값 (백엔드의 PORT 처리와 같은 방식)
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|raw| raw.trim().parse().ok()).unwrap_or(default)
}
