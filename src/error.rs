//! # 에러 처리 모듈
//!
//! 클라이언트에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `ClientError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `ClientError::from_status()`: HTTP 응답(상태 코드 + 본문)을 에러로 변환
//! - `ErrorKind`: 화면이 에러를 어떻게 다룰지 결정하는 분류
//!   (다시 선택 / 로그인 화면으로 이동 / 재시도)

use serde_json::Value;
use thiserror::Error;

/// 클라이언트에서 발생할 수 있는 모든 에러 종류
///
/// 라이브러리의 모든 비동기 함수는 `Result<T, ClientError>`를 반환합니다.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 문서나 버전이 존재하지 않음 (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 인증 실패 또는 접근 권한 없음 (HTTP 401/403)
    /// 로컬에서 재시도하지 않고 로그인 화면으로 넘깁니다.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 연결 실패, 타임아웃 등 일시적인 네트워크 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 그 밖의 HTTP 오류 응답
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 응답 본문을 기대한 타입으로 해석할 수 없음
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// 잘못된 설정값 (예: 빈 API 주소)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 토큰 파일 입출력 오류
    /// #[from]: std::io::Error → ClientError::Io 자동 변환
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 에러를 다루는 방식에 따른 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 문서/버전 없음. 다른 항목을 선택하면 복구됩니다.
    NotFound,
    /// 로그인 화면으로 이동해야 함
    Unauthorized,
    /// 일시적 실패. 제한된 횟수만큼 재시도할 수 있습니다.
    NetworkFailure,
    /// 그 밖의 실패
    Other,
}

// reqwest 에러를 ClientError로 변환합니다.
// 이 구현 덕분에 reqwest 호출 뒤에 `?`를 바로 쓸 수 있습니다.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl ClientError {
    /// 실패한 HTTP 응답을 에러로 변환합니다.
    ///
    /// 에러 메시지는 JSON 본문의 `detail`, `error`, `error.message` 순서로 찾고,
    /// 아무것도 없으면 `Request failed with status N`을 사용합니다.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = error_message(body)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            404 => ClientError::NotFound(message),
            401 | 403 => ClientError::Unauthorized(message),
            _ => ClientError::Api { status, message },
        }
    }

    /// 응답 상태 코드. 응답을 받지 못한 에러는 `None`입니다.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound(_) => Some(404),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Unauthorized(_) => ErrorKind::Unauthorized,
            ClientError::Network(_) => ErrorKind::NetworkFailure,
            ClientError::Api { status, .. } if *status >= 500 => ErrorKind::NetworkFailure,
            _ => ErrorKind::Other,
        }
    }

    /// 재시도할 가치가 있는 에러인지 확인합니다.
    /// 4xx(클라이언트 오류)는 다시 보내도 결과가 같으므로 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::NetworkFailure
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    // 백엔드마다 에러 모양이 다릅니다:
    // { "detail": "..." }, { "error": "..." }, { "error": { "code": "...", "message": "..." } }
    let candidates = [
        value.get("detail"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    message
}
