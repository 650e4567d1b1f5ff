//! 인증 엔드포인트.
//!
//! `login()`은 받은 토큰을 보관소에 저장하기까지만 합니다.
//! 사용자 정보 재조회는 `Workspace::login()`이 이어서 명시적으로 호출합니다.

use super::{endpoints, ApiClient};
use crate::{
    error::ClientError,
    models::{LoginResponse, User, UserCreate, UserLogin},
};

pub async fn register(client: &ApiClient, data: &UserCreate) -> Result<User, ClientError> {
    client.post(endpoints::auth::REGISTER, data, Vec::new()).await
}

pub async fn login(client: &ApiClient, data: &UserLogin) -> Result<LoginResponse, ClientError> {
    let response: LoginResponse = client
        .post(endpoints::auth::LOGIN, data, Vec::new())
        .await?;
    client.set_token(Some(response.access_token.clone())).await?;
    tracing::info!("Logged in as {}", data.email);
    Ok(response)
}

pub async fn current_user(client: &ApiClient) -> Result<User, ClientError> {
    client.get(endpoints::auth::ME, Vec::new()).await
}

/// 서버 로그아웃이 실패해도(토큰이 이미 만료된 경우 등) 로컬 토큰은 항상 지웁니다.
pub async fn logout(client: &ApiClient) -> Result<(), ClientError> {
    if let Err(e) = client.post_empty::<serde_json::Value>(endpoints::auth::LOGOUT).await {
        tracing::warn!("Server logout failed, clearing client token: {}", e);
    }
    client.set_token(None).await
}

pub async fn is_authenticated(client: &ApiClient) -> Result<bool, ClientError> {
    Ok(client.token().await?.is_some())
}
