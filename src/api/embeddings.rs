//! 임베딩 엔드포인트. 벡터 검색 자체는 백엔드가 수행합니다.

use super::{endpoints, ApiClient};
use crate::{
    error::ClientError,
    models::{
        Embedding, EmbeddingCreateRequest, EmbeddingCreateResponse, EmbeddingDeleteResponse,
        EmbeddingSearchRequest, EmbeddingSearchResponse,
    },
};

/// `text`(서버에서 자동 분할) 또는 `chunks`(미리 분할한 조각) 중 하나를 넘깁니다.
pub async fn create_embeddings(
    client: &ApiClient,
    data: &EmbeddingCreateRequest,
) -> Result<EmbeddingCreateResponse, ClientError> {
    client.post(endpoints::embeddings::CREATE, data, Vec::new()).await
}

pub async fn search_embeddings(
    client: &ApiClient,
    data: &EmbeddingSearchRequest,
) -> Result<EmbeddingSearchResponse, ClientError> {
    client.post(endpoints::embeddings::SEARCH, data, Vec::new()).await
}

pub async fn document_embeddings(
    client: &ApiClient,
    doc_id: &str,
) -> Result<Vec<Embedding>, ClientError> {
    client
        .get(&endpoints::embeddings::by_document(doc_id), Vec::new())
        .await
}

pub async fn delete_document_embeddings(
    client: &ApiClient,
    doc_id: &str,
) -> Result<EmbeddingDeleteResponse, ClientError> {
    client
        .delete(&endpoints::embeddings::by_document(doc_id), Vec::new())
        .await
}
