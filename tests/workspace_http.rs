// 프로세스 내 목 백엔드를 상대로 한 Workspace 테스트: 인증, 에러 변환, 재시도, 캐시 무효화.

mod common;

use std::{collections::HashSet, sync::Arc, sync::atomic::Ordering};

use common::{workspace, workspace_with, Backend, PASSWORD, TOKEN};
use docspace::{
    api::{FileTokenStore, TokenStore},
    cache::QueryKey,
    models::{
        Document, DocumentCreate, DocumentUpdate, EmbeddingCreateRequest, ListDocumentsParams,
        UserLogin,
    },
    versions::{ComparisonSession, VersionSelection, ViewState},
    ClientError, ErrorKind,
};

fn credentials(password: &str) -> UserLogin {
    UserLogin {
        email: "writer@example.com".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn login_stores_token_and_fetches_user_once() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    let response = ws.login(&credentials(PASSWORD)).await.unwrap();
    assert_eq!(response.access_token, TOKEN);
    assert_eq!(response.user.unwrap().email, "writer@example.com");
    assert_eq!(ws.client().token().await.unwrap().as_deref(), Some(TOKEN));

    // 캐시에서 응답
    let user = ws.current_user().await.unwrap().unwrap();
    assert_eq!(user.name, "Test Writer");
    assert_eq!(backend.hits("GET /api/auth/me"), 1);
}

#[tokio::test]
async fn wrong_password_is_unauthorized_with_server_message() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    let err = ws.login(&credentials("nope")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.to_string().contains("Incorrect email or password"));
    assert_eq!(ws.client().token().await.unwrap(), None);
}

#[tokio::test]
async fn current_user_without_token_makes_no_request() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    assert!(ws.current_user().await.unwrap().is_none());
    assert_eq!(backend.hits("GET /api/auth/me"), 0);
}

#[tokio::test]
async fn rejected_token_is_cleared() {
    let backend = Backend::new(&["v1"]);
    let base = backend.spawn().await;
    let ws = workspace_with(
        &base,
        Arc::new(docspace::api::MemoryTokenStore::new(Some("expired".into()))),
    );

    let err = ws.current_user().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(ws.client().token().await.unwrap(), None);
}

#[tokio::test]
async fn token_file_survives_a_new_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth").join("token");
    let backend = Backend::new(&["v1"]);
    let base = backend.spawn().await;

    let first = workspace_with(&base, Arc::new(FileTokenStore::new(&path)));
    first.login(&credentials(PASSWORD)).await.unwrap();

    let second = workspace_with(&base, Arc::new(FileTokenStore::new(&path)));
    let user = second.current_user().await.unwrap();
    assert!(user.is_some());

    second.logout().await.unwrap();
    assert!(!path.exists());
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&path));
    assert_eq!(store.token().await.unwrap(), None);
}

#[tokio::test]
async fn missing_document_maps_to_not_found() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    match ws.document("missing").await {
        Err(ClientError::NotFound(message)) => assert_eq!(message, "Document not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    // 4xx는 재시도하지 않음
    assert_eq!(backend.hits("GET /api/documents/{id}"), 1);
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let backend = Backend::new(&["v1"]);
    backend.list_failures.store(2, Ordering::SeqCst);
    let ws = workspace(&backend.spawn().await);

    let documents = ws.documents(ListDocumentsParams::default()).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(backend.hits("GET /api/documents"), 3);
}

#[tokio::test]
async fn retries_give_up_after_policy_limit() {
    let backend = Backend::new(&["v1"]);
    backend.list_failures.store(5, Ordering::SeqCst);
    let ws = workspace(&backend.spawn().await);

    let err = ws.documents(ListDocumentsParams::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 503, ref message } if message == "busy"));
    assert_eq!(backend.hits("GET /api/documents"), 3);

    // 실패는 캐시되지 않음
    backend.list_failures.store(0, Ordering::SeqCst);
    assert!(ws.documents(ListDocumentsParams::default()).await.is_ok());
}

#[tokio::test]
async fn every_request_carries_a_distinct_request_id() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    ws.document("doc-1").await.unwrap();
    ws.versions("doc-1").await.unwrap();
    ws.version("doc-1", 1).await.unwrap();

    let ids = backend.request_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
}

#[tokio::test]
async fn update_refreshes_detail_and_invalidates_versions() {
    let backend = Backend::new(&["one", "one\ntwo"]);
    let ws = workspace(&backend.spawn().await);

    assert_eq!(ws.versions("doc-1").await.unwrap().len(), 2);
    assert_eq!(ws.versions("doc-1").await.unwrap().len(), 2);
    assert_eq!(backend.hits("GET /api/documents/{id}/versions"), 1);

    let update = DocumentUpdate {
        content: Some("one\ntwo\nthree".into()),
        ..Default::default()
    };
    ws.update_document("doc-1", &update).await.unwrap();

    // 수정 응답이 상세 캐시에 바로 기록됨
    let document = ws.document("doc-1").await.unwrap();
    assert_eq!(document.content, "one\ntwo\nthree");
    assert_eq!(backend.hits("GET /api/documents/{id}"), 0);

    assert_eq!(ws.versions("doc-1").await.unwrap().len(), 3);
    assert_eq!(backend.hits("GET /api/documents/{id}/versions"), 2);
}

#[tokio::test]
async fn create_refetches_document_lists() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    assert_eq!(ws.documents(ListDocumentsParams::default()).await.unwrap().len(), 1);
    assert_eq!(ws.documents(ListDocumentsParams::default()).await.unwrap().len(), 1);
    assert_eq!(backend.hits("GET /api/documents"), 1);

    let created = ws
        .create_document(&DocumentCreate {
            title: "Release Notes".into(),
            content: "# 1.0".into(),
            doc_type: None,
        })
        .await
        .unwrap();
    assert_eq!(created.title, "Release Notes");
    assert_eq!(backend.hits("POST /api/documents"), 1);

    let documents = ws.documents(ListDocumentsParams::default()).await.unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().any(|d| d.id == created.id));
    assert_eq!(backend.hits("GET /api/documents"), 2);
}

#[tokio::test]
async fn delete_drops_detail_and_refetches_lists() {
    let backend = Backend::new(&["one", "one\ntwo"]);
    let ws = workspace(&backend.spawn().await);

    ws.document("doc-1").await.unwrap();
    ws.versions("doc-1").await.unwrap();
    ws.documents(ListDocumentsParams::default()).await.unwrap();

    ws.delete_document("doc-1").await.unwrap();
    assert_eq!(backend.hits("DELETE /api/documents/{id}"), 1);

    // 지운 문서는 캐시에 남아 있지 않으므로 서버에 다시 묻고 404를 받음
    assert_eq!(ws.document("doc-1").await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(backend.hits("GET /api/documents/{id}"), 2);
    assert_eq!(ws.versions("doc-1").await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(backend.hits("GET /api/documents/{id}/versions"), 2);
    let detail = QueryKey::DocumentDetail("doc-1".into());
    assert!(ws.cache().get::<Document>(&detail).is_none());

    assert!(ws.documents(ListDocumentsParams::default()).await.unwrap().is_empty());
    assert_eq!(backend.hits("GET /api/documents"), 2);
}

#[tokio::test]
async fn embedding_changes_refetch_document_embeddings() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);

    assert!(ws.document_embeddings("doc-1").await.unwrap().is_empty());
    assert!(ws.document_embeddings("doc-1").await.unwrap().is_empty());
    assert_eq!(backend.hits("GET /api/embeddings/doc/{id}"), 1);

    let created = ws
        .create_embeddings(&EmbeddingCreateRequest {
            doc_id: "doc-1".into(),
            chunks: Some(vec!["Install".into(), "Configure".into()]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.chunks_count, 2);

    let embeddings = ws.document_embeddings("doc-1").await.unwrap();
    let texts: Vec<&str> = embeddings.iter().map(|e| e.chunk_text.as_str()).collect();
    assert_eq!(texts, vec!["Install", "Configure"]);
    assert_eq!(backend.hits("GET /api/embeddings/doc/{id}"), 2);

    let deleted = ws.delete_embeddings("doc-1").await.unwrap();
    assert_eq!(deleted.deleted_count, 2);
    assert!(ws.document_embeddings("doc-1").await.unwrap().is_empty());
    assert_eq!(backend.hits("GET /api/embeddings/doc/{id}"), 3);
}

#[tokio::test]
async fn logout_clears_token_and_cache() {
    let backend = Backend::new(&["v1"]);
    let ws = workspace(&backend.spawn().await);
    ws.login(&credentials(PASSWORD)).await.unwrap();
    ws.versions("doc-1").await.unwrap();
    assert!(!ws.cache().is_empty());

    ws.logout().await.unwrap();
    assert!(ws.cache().is_empty());
    assert_eq!(ws.client().token().await.unwrap(), None);
    assert_eq!(backend.hits("POST /api/auth/logout"), 1);
}

#[tokio::test]
async fn comparison_session_runs_over_http() {
    let backend = Backend::new(&["# Guide", "# Guide\nIntro", "# Guide\nIntro v2\nUsage"]);
    let ws = workspace(&backend.spawn().await);
    let mut session = ComparisonSession::new();

    let state = session.open_document(&ws, "doc-1").await;
    let ViewState::ComparisonReady { selection, view, .. } = state else {
        panic!("expected a comparison, got {state:?}");
    };
    assert_eq!(*selection, VersionSelection { from: 2, to: 3 });
    assert_eq!(view.stats.unchanged, 1);
    assert_eq!(view.stats.changed, 1);
    assert_eq!(view.stats.added, 1);

    session.choose_from(&ws, 1).await;
    assert!(matches!(
        session.state(),
        ViewState::ComparisonReady { selection: VersionSelection { from: 1, to: 3 }, .. }
    ));
    // 두 번째 v3는 캐시에서 나옴
    assert_eq!(backend.hits("GET /api/documents/{id}/versions/{n}"), 3);

    session.choose_to(&ws, 9).await;
    assert!(matches!(
        session.state(),
        ViewState::VersionUnavailable { version_number: 9, .. }
    ));
}
