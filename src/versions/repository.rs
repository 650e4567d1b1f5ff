//! 버전 저장소 경계.
//!
//! 비교 화면은 이 트레이트로만 버전을 읽습니다. 구현체:
//! - `ApiClient`: 매번 백엔드 호출
//! - `Workspace`: 쿼리 캐시 + 재시도를 거쳐 호출

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{self, ApiClient},
    error::ClientError,
    models::DocumentVersion,
};

#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// 문서의 버전 목록 (최신 버전이 먼저).
    /// 문서가 없으면 `NotFound`, 접근 권한이 없으면 `Unauthorized`.
    async fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, ClientError>;

    /// 특정 버전의 스냅샷. 해당 번호의 버전이 없으면 `NotFound`.
    async fn get_version(
        &self,
        document_id: &str,
        version_number: i64,
    ) -> Result<DocumentVersion, ClientError>;
}

#[async_trait]
impl VersionRepository for ApiClient {
    async fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, ClientError> {
        api::documents::list_versions(self, document_id).await
    }

    async fn get_version(
        &self,
        document_id: &str,
        version_number: i64,
    ) -> Result<DocumentVersion, ClientError> {
        api::documents::get_version(self, document_id, version_number).await
    }
}

#[async_trait]
impl<R: VersionRepository + ?Sized> VersionRepository for Arc<R> {
    async fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, ClientError> {
        (**self).list_versions(document_id).await
    }

    async fn get_version(
        &self,
        document_id: &str,
        version_number: i64,
    ) -> Result<DocumentVersion, ClientError> {
        (**self).get_version(document_id, version_number).await
    }
}
