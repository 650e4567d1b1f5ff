//! 문서 엔드포인트: CRUD, AI 생성/수정/감사, 버전 조회.

use super::{client::Query, endpoints, ApiClient};
use crate::{
    error::ClientError,
    models::{
        Document, DocumentAuditRequest, DocumentAuditResponse, DocumentCreate,
        DocumentGenerateRequest, DocumentUpdate, DocumentUpdateWithAgentRequest, DocumentVersion,
        ListDocumentsParams,
    },
};

pub async fn list_documents(
    client: &ApiClient,
    params: ListDocumentsParams,
) -> Result<Vec<Document>, ClientError> {
    let mut query: Query = Vec::new();
    if let Some(skip) = params.skip {
        query.push(("skip", skip.to_string()));
    }
    if let Some(limit) = params.limit {
        query.push(("limit", limit.to_string()));
    }
    client.get(endpoints::documents::LIST, query).await
}

pub async fn get_document(client: &ApiClient, doc_id: &str) -> Result<Document, ClientError> {
    client.get(&endpoints::documents::get(doc_id), Vec::new()).await
}

pub async fn create_document(
    client: &ApiClient,
    data: &DocumentCreate,
) -> Result<Document, ClientError> {
    client.post(endpoints::documents::CREATE, data, Vec::new()).await
}

/// 문서를 수정합니다. 서버는 수정할 때마다 새 버전을 만듭니다.
pub async fn update_document(
    client: &ApiClient,
    doc_id: &str,
    data: &DocumentUpdate,
) -> Result<Document, ClientError> {
    client
        .put(&endpoints::documents::get(doc_id), data, Vec::new())
        .await
}

pub async fn delete_document(client: &ApiClient, doc_id: &str) -> Result<(), ClientError> {
    client
        .delete::<serde_json::Value>(&endpoints::documents::get(doc_id), Vec::new())
        .await
        .map(|_| ())
}

pub async fn generate_document(
    client: &ApiClient,
    data: &DocumentGenerateRequest,
    create_embeddings: bool,
) -> Result<Document, ClientError> {
    client
        .post(
            endpoints::documents::GENERATE,
            data,
            vec![("create_embeddings", create_embeddings.to_string())],
        )
        .await
}

pub async fn update_document_with_agent(
    client: &ApiClient,
    data: &DocumentUpdateWithAgentRequest,
    update_embeddings: bool,
) -> Result<Document, ClientError> {
    client
        .post(
            endpoints::documents::UPDATE_WITH_AGENT,
            data,
            vec![("update_embeddings", update_embeddings.to_string())],
        )
        .await
}

pub async fn audit_document(
    client: &ApiClient,
    doc_id: &str,
    options: &DocumentAuditRequest,
) -> Result<DocumentAuditResponse, ClientError> {
    client
        .post(&endpoints::documents::audit(doc_id), options, Vec::new())
        .await
}

/// 버전 목록 (최신 버전이 먼저)
pub async fn list_versions(
    client: &ApiClient,
    doc_id: &str,
) -> Result<Vec<DocumentVersion>, ClientError> {
    client
        .get(&endpoints::documents::versions(doc_id), Vec::new())
        .await
}

pub async fn get_version(
    client: &ApiClient,
    doc_id: &str,
    version_number: i64,
) -> Result<DocumentVersion, ClientError> {
    client
        .get(&endpoints::documents::version(doc_id, version_number), Vec::new())
        .await
}
