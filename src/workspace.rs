//! # 워크스페이스 (데이터 조회 계층)
//!
//! API 클라이언트 + 쿼리 캐시 + 재시도 정책을 묶은 진입점입니다.
//!
//! - 조회(query): 캐시에 신선한 값이 있으면 그대로, 없으면 재시도 정책을 적용해 가져옵니다.
//! - 변경(mutation): 재시도하지 않습니다. 성공하면 영향을 받는 캐시 범위를 직접 무효화합니다.
//! - 인증: `login()`은 토큰 저장 후 사용자 정보를 **이어서** 다시 조회합니다.
//!   `logout()`은 토큰과 캐시를 모두 비웁니다.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    api::{self, ApiClient, TokenStore},
    cache::{QueryCache, QueryKey, QueryScope},
    config::Config,
    error::{ClientError, ErrorKind},
    models::*,
    retry::RetryPolicy,
    versions::VersionRepository,
};

/// 종류별 캐시 유효 시간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimes {
    pub documents: Duration,
    pub detail: Duration,
    pub versions: Duration,
    pub version: Duration,
}

impl StaleTimes {
    pub fn from_config(config: &Config) -> Self {
        Self {
            documents: config.documents_stale,
            detail: config.detail_stale,
            versions: config.versions_stale,
            version: config.version_stale,
        }
    }
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct Workspace {
    client: ApiClient,
    cache: QueryCache,
    retry: RetryPolicy,
    stale: StaleTimes,
}

impl Workspace {
    pub fn new(client: ApiClient, retry: RetryPolicy, stale: StaleTimes) -> Self {
        Self {
            client,
            cache: QueryCache::new(),
            retry,
            stale,
        }
    }

    pub fn from_config(config: &Config, tokens: Option<Arc<dyn TokenStore>>) -> Result<Self, ClientError> {
        Ok(Self::new(
            ApiClient::from_config(config, tokens)?,
            RetryPolicy::from_config(config),
            StaleTimes::from_config(config),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, stale: Duration, fetch: F) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        self.cache
            .get_or_fetch(key, stale, || self.retry.run(fetch))
            .await
    }

    // ── 인증 ──

    /// 현재 사용자. 토큰이 없으면 요청 없이 `None`을 돌려줍니다.
    /// 토큰이 거부되면(401) 저장된 토큰을 지웁니다.
    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        if self.client.token().await?.is_none() {
            return Ok(None);
        }

        let result = self
            .query(QueryKey::AuthMe, self.stale.detail, || {
                api::auth::current_user(&self.client)
            })
            .await;

        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.kind() == ErrorKind::Unauthorized => {
                tracing::info!("Stored token was rejected, clearing it");
                self.client.set_token(None).await?;
                self.cache.remove(&QueryScope::Auth);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn refetch_user(&self) -> Result<Option<User>, ClientError> {
        self.cache.invalidate(&QueryScope::Auth);
        self.current_user().await
    }

    /// 로그인 후 사용자 정보를 다시 조회합니다. 사용자 조회가 실패해도 로그인은 성공으로 봅니다.
    pub async fn login(&self, data: &UserLogin) -> Result<LoginResponse, ClientError> {
        let mut response = api::auth::login(&self.client, data).await?;

        match self.refetch_user().await {
            Ok(user) => response.user = user,
            Err(e) => tracing::warn!("Failed to fetch user after login: {}", e),
        }
        Ok(response)
    }

    /// 토큰이 있고 사용자 정보도 받아 둔 상태
    pub async fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(api::auth::is_authenticated(&self.client).await?
            && self.cache.get::<User>(&QueryKey::AuthMe).is_some())
    }

    pub async fn register(&self, data: &UserCreate) -> Result<User, ClientError> {
        api::auth::register(&self.client, data).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = api::auth::logout(&self.client).await;
        self.cache.clear();
        result
    }

    // ── 문서 조회 ──

    pub async fn documents(&self, params: ListDocumentsParams) -> Result<Vec<Document>, ClientError> {
        self.query(QueryKey::DocumentList(params), self.stale.documents, || {
            api::documents::list_documents(&self.client, params)
        })
        .await
    }

    pub async fn document(&self, doc_id: &str) -> Result<Document, ClientError> {
        self.query(
            QueryKey::DocumentDetail(doc_id.to_string()),
            self.stale.detail,
            || api::documents::get_document(&self.client, doc_id),
        )
        .await
    }

    pub async fn versions(&self, doc_id: &str) -> Result<Vec<DocumentVersion>, ClientError> {
        self.query(
            QueryKey::VersionList(doc_id.to_string()),
            self.stale.versions,
            || api::documents::list_versions(&self.client, doc_id),
        )
        .await
    }

    pub async fn version(&self, doc_id: &str, version_number: i64) -> Result<DocumentVersion, ClientError> {
        self.query(
            QueryKey::Version(doc_id.to_string(), version_number),
            self.stale.version,
            || api::documents::get_version(&self.client, doc_id, version_number),
        )
        .await
    }

    // ── 문서 변경 ──

    pub async fn create_document(&self, data: &DocumentCreate) -> Result<Document, ClientError> {
        let document = api::documents::create_document(&self.client, data).await?;
        self.cache.invalidate(&QueryScope::DocumentLists);
        Ok(document)
    }

    /// 수정하면 서버가 새 버전을 만들므로 그 문서의 버전 캐시도 무효화합니다.
    pub async fn update_document(&self, doc_id: &str, data: &DocumentUpdate) -> Result<Document, ClientError> {
        let document = api::documents::update_document(&self.client, doc_id, data).await?;
        self.after_document_written(&document, true);
        Ok(document)
    }

    pub async fn delete_document(&self, doc_id: &str) -> Result<(), ClientError> {
        api::documents::delete_document(&self.client, doc_id).await?;
        self.cache.remove(&QueryScope::Document(doc_id.to_string()));
        self.cache.invalidate(&QueryScope::DocumentLists);
        Ok(())
    }

    pub async fn generate_document(
        &self,
        data: &DocumentGenerateRequest,
        create_embeddings: bool,
    ) -> Result<Document, ClientError> {
        let document = api::documents::generate_document(&self.client, data, create_embeddings).await?;
        self.after_document_written(&document, false);
        if create_embeddings {
            self.cache.invalidate(&QueryScope::Embeddings);
        }
        Ok(document)
    }

    pub async fn update_document_with_agent(
        &self,
        data: &DocumentUpdateWithAgentRequest,
        update_embeddings: bool,
    ) -> Result<Document, ClientError> {
        let document =
            api::documents::update_document_with_agent(&self.client, data, update_embeddings).await?;
        self.after_document_written(&document, true);
        if update_embeddings {
            self.cache.invalidate(&QueryScope::Embeddings);
        }
        Ok(document)
    }

    /// 감사 결과는 캐시하지 않습니다.
    pub async fn audit_document(
        &self,
        doc_id: &str,
        options: &DocumentAuditRequest,
    ) -> Result<DocumentAuditResponse, ClientError> {
        api::documents::audit_document(&self.client, doc_id, options).await
    }

    fn after_document_written(&self, document: &Document, new_version: bool) {
        self.cache
            .set(QueryKey::DocumentDetail(document.id.clone()), document.clone());
        self.cache.invalidate(&QueryScope::DocumentLists);
        if new_version {
            self.cache.invalidate(&QueryScope::Versions(document.id.clone()));
        }
    }

    // ── 임베딩 ──

    pub async fn document_embeddings(&self, doc_id: &str) -> Result<Vec<Embedding>, ClientError> {
        self.query(
            QueryKey::EmbeddingsByDocument(doc_id.to_string()),
            self.stale.detail,
            || api::embeddings::document_embeddings(&self.client, doc_id),
        )
        .await
    }

    pub async fn search_embeddings(
        &self,
        request: &EmbeddingSearchRequest,
    ) -> Result<EmbeddingSearchResponse, ClientError> {
        self.query(
            QueryKey::EmbeddingSearch(request.clone()),
            self.stale.documents,
            || api::embeddings::search_embeddings(&self.client, request),
        )
        .await
    }

    /// 새 조각이 검색 결과에도 나올 수 있으므로 임베딩 캐시 전체를 무효화합니다.
    pub async fn create_embeddings(
        &self,
        request: &EmbeddingCreateRequest,
    ) -> Result<EmbeddingCreateResponse, ClientError> {
        let response = api::embeddings::create_embeddings(&self.client, request).await?;
        self.cache.invalidate(&QueryScope::Embeddings);
        Ok(response)
    }

    pub async fn delete_embeddings(&self, doc_id: &str) -> Result<EmbeddingDeleteResponse, ClientError> {
        let response = api::embeddings::delete_document_embeddings(&self.client, doc_id).await?;
        self.cache
            .remove(&QueryScope::EmbeddingsForDocument(doc_id.to_string()));
        self.cache.invalidate(&QueryScope::Embeddings);
        Ok(response)
    }
}

#[async_trait]
impl VersionRepository for Workspace {
    async fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, ClientError> {
        self.versions(document_id).await
    }

    async fn get_version(
        &self,
        document_id: &str,
        version_number: i64,
    ) -> Result<DocumentVersion, ClientError> {
        self.version(document_id, version_number).await
    }
}
