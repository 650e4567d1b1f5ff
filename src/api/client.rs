//! # 공통 HTTP 클라이언트
//!
//! 모든 API 호출이 거치는 `ApiClient`입니다.
//!
//! 요청 하나의 흐름:
//! 1. `build_url()`: 기본 주소 + 경로 (경로 앞의 `/`는 없어도 됨)
//! 2. 쿼리 파라미터, JSON 본문, `Authorization: Bearer ...`, `x-request-id` 추가
//! 3. 전송 실패(연결/타임아웃) → `ClientError::Network`
//! 4. 2xx가 아니면 → `ClientError::from_status()`
//! 5. Content-Type이 JSON이면 JSON으로, 아니면 문자열로 해석

use std::{sync::Arc, time::Duration};

use reqwest::{header, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::token::{MemoryTokenStore, TokenStore};
use crate::{config::Config, error::ClientError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 쿼리 파라미터 목록. 값이 없는 항목은 호출하는 쪽에서 미리 빼고 넘깁니다.
pub type Query = Vec<(&'static str, String)>;

/// 백엔드 REST API 클라이언트
///
/// `reqwest::Client`와 토큰 보관소는 모두 `Arc`로 공유되므로 clone 비용이 작습니다.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base URL must not be empty".to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    /// 설정값으로 클라이언트를 만듭니다. 설정에 토큰이 있으면 메모리 보관소에 넣어 둡니다.
    pub fn from_config(config: &Config, tokens: Option<Arc<dyn TokenStore>>) -> Result<Self, ClientError> {
        let tokens = tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new(config.token.clone())));
        Self::new(&config.api_base_url, config.request_timeout, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) -> Result<(), ClientError> {
        self.tokens.set_token(token).await
    }

    pub async fn token(&self) -> Result<Option<String>, ClientError> {
        self.tokens.token().await
    }

    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T, ClientError> {
        self.execute(Method::GET, path, self.builder(Method::GET, path, &query))
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B, query: Query) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.builder(Method::POST, path, &query).json(body);
        self.execute(Method::POST, path, builder).await
    }

    /// 본문 없는 POST (예: 로그아웃)
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(Method::POST, path, self.builder(Method::POST, path, &[]))
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B, query: Query) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.builder(Method::PUT, path, &query).json(body);
        self.execute(Method::PUT, path, builder).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T, ClientError> {
        self.execute(Method::DELETE, path, self.builder(Method::DELETE, path, &query))
            .await
    }

    fn builder(&self, method: Method, path: &str, query: &[(&'static str, String)]) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.build_url(path))
            .header(header::ACCEPT, "application/json");
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let request_id = uuid::Uuid::now_v7().to_string();
        let mut builder = builder.header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.tokens.token().await? {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(%method, path, request_id = %request_id, "Sending request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, request_id = %request_id, "Request failed: {}", e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response.text().await?;

        tracing::debug!(%method, path, request_id = %request_id, status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(ClientError::from_status(status.as_u16(), &text));
        }

        decode_body(&text, is_json)
    }
}

/// 성공 응답 본문을 해석합니다.
/// - 빈 본문(204 등)은 JSON `null`로 취급하므로 `()`나 `Option<T>`로 받을 수 있습니다.
/// - JSON이 아닌 본문은 문자열 값으로 취급합니다.
fn decode_body<T: DeserializeOwned>(text: &str, is_json: bool) -> Result<T, ClientError> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    if is_json {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_json::from_value(Value::String(text.to_string()))?)
    }
}
