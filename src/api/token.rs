//! # Bearer 토큰 보관소
//!
//! `ApiClient`는 요청마다 보관소에서 토큰을 꺼내 `Authorization` 헤더에 붙입니다.
//! - `MemoryTokenStore`: 프로세스 메모리에만 보관
//! - `FileTokenStore`: 파일에 보관하여 CLI 실행 사이에도 로그인 상태 유지.
//!   처음 읽을 때 파일에서 불러온 뒤 메모리에 캐시합니다.

use std::{path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use tokio::fs;

use crate::error::ClientError;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn token(&self) -> Result<Option<String>, ClientError>;

    /// `None`을 넘기면 토큰을 지웁니다.
    async fn set_token(&self, token: Option<String>) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(lock(&self.token).clone())
    }

    async fn set_token(&self, token: Option<String>) -> Result<(), ClientError> {
        *lock(&self.token) = token;
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // 한 번도 파일을 읽지 않았으면 None, 읽었으면 Some(토큰 또는 없음)
    cached: tokio::sync::Mutex<Option<Option<String>>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = match fs::read_to_string(&self.path).await {
            Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn set_token(&self, token: Option<String>) -> Result<(), ClientError> {
        let mut cached = self.cached.lock().await;
        match &token {
            Some(value) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&self.path, value).await?;
            }
            None => match fs::remove_file(&self.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        *cached = Some(token);
        Ok(())
    }
}

// 독이 든(poisoned) 뮤텍스라도 안의 Option<String>은 항상 유효한 값입니다.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
