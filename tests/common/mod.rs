// 통합 테스트가 함께 쓰는 프로세스 내 목(mock) 백엔드.
// 문서 "doc-1" 하나를 기본으로 제공하며, PUT 할 때마다 버전이 하나씩 늘어납니다.

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use docspace::{
    api::{ApiClient, MemoryTokenStore, TokenStore},
    retry::RetryPolicy,
    StaleTimes, Workspace,
};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";
pub const TIMESTAMP: &str = "2024-06-01T12:00:00Z";

type Reply = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct Backend {
    hits: Arc<Mutex<Vec<String>>>,
    request_ids: Arc<Mutex<Vec<String>>>,
    /// doc-1의 버전별 내용 (version_number = 인덱스 + 1)
    versions: Arc<Mutex<Vec<String>>>,
    /// doc-1이 DELETE로 지워졌는지
    deleted: Arc<AtomicBool>,
    /// POST /api/documents로 만든 문서들
    created: Arc<Mutex<Vec<Value>>>,
    /// (문서 id, 조각 텍스트)
    chunks: Arc<Mutex<Vec<(String, String)>>>,
    /// /api/documents가 성공하기 전에 돌려줄 503 응답 수
    pub list_failures: Arc<AtomicUsize>,
}

impl Backend {
    pub fn new(versions: &[&str]) -> Self {
        Self {
            hits: Arc::default(),
            request_ids: Arc::default(),
            versions: Arc::new(Mutex::new(versions.iter().map(|s| s.to_string()).collect())),
            deleted: Arc::default(),
            created: Arc::default(),
            chunks: Arc::default(),
            list_failures: Arc::default(),
        }
    }

    pub fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().iter().filter(|h| *h == route).count()
    }

    pub fn request_ids(&self) -> Vec<String> {
        self.request_ids.lock().unwrap().clone()
    }

    fn record(&self, route: &str, headers: &HeaderMap) {
        self.hits.lock().unwrap().push(route.to_string());
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
    }

    fn exists(&self, id: &str) -> bool {
        id == "doc-1" && !self.deleted.load(Ordering::SeqCst)
    }

    fn document(&self) -> Value {
        let content = self.versions.lock().unwrap().last().cloned().unwrap_or_default();
        document_json("doc-1", "API Guide", &content)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/me", get(me))
            .route("/api/documents", get(list_documents).post(create_document))
            .route(
                "/api/documents/{id}",
                get(get_document).put(update_document).delete(delete_document),
            )
            .route("/api/documents/{id}/versions", get(list_versions))
            .route("/api/documents/{id}/versions/{n}", get(get_version))
            .route("/api/embeddings/create", post(create_embeddings))
            .route(
                "/api/embeddings/doc/{id}",
                get(document_embeddings).delete(delete_embeddings),
            )
            .with_state(self.clone())
    }

    /// 임의의 포트에 바인딩하고 기본 URL을 돌려줍니다.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

fn document_json(id: &str, title: &str, content: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "doc_type": "guide",
        "created_by": "user-1",
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP,
    })
}

fn version_json(doc_id: &str, number: usize, content: &str) -> Value {
    json!({
        "id": format!("ver-{number}"),
        "doc_id": doc_id,
        "version_number": number,
        "content": content,
        "diff": format!("Edit {number}"),
        "updated_by": "writer@example.com",
        "timestamp": TIMESTAMP,
    })
}

fn not_found(what: &str) -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": format!("{what} not found") })))
}

async fn login(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    b.record("POST /api/auth/login", &headers);
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
    )
}

async fn logout(State(b): State<Backend>, headers: HeaderMap) -> Reply {
    b.record("POST /api/auth/logout", &headers);
    (StatusCode::OK, Json(json!({ "message": "Logged out" })))
}

async fn me(State(b): State<Backend>, headers: HeaderMap) -> Reply {
    b.record("GET /api/auth/me", &headers);
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Could not validate credentials" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": "user-1",
            "name": "Test Writer",
            "email": "writer@example.com",
            "role": "technical_writer",
            "created_at": TIMESTAMP,
            "updated_at": TIMESTAMP,
        })),
    )
}

async fn list_documents(State(b): State<Backend>, headers: HeaderMap) -> Reply {
    b.record("GET /api/documents", &headers);
    let remaining = b.list_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        b.list_failures.store(remaining - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "busy" })));
    }
    let mut documents = Vec::new();
    if b.exists("doc-1") {
        documents.push(b.document());
    }
    documents.extend(b.created.lock().unwrap().iter().cloned());
    (StatusCode::OK, Json(Value::Array(documents)))
}

async fn create_document(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    b.record("POST /api/documents", &headers);
    let mut created = b.created.lock().unwrap();
    let id = format!("doc-{}", created.len() + 2);
    let document = document_json(
        &id,
        body["title"].as_str().unwrap_or_default(),
        body["content"].as_str().unwrap_or_default(),
    );
    created.push(document.clone());
    (StatusCode::CREATED, Json(document))
}

async fn delete_document(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.record("DELETE /api/documents/{id}", &headers);
    if !b.exists(&id) {
        return not_found("Document");
    }
    b.deleted.store(true, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({ "message": "Document deleted" })))
}

async fn get_document(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.record("GET /api/documents/{id}", &headers);
    if !b.exists(&id) {
        return not_found("Document");
    }
    (StatusCode::OK, Json(b.document()))
}

async fn update_document(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    b.record("PUT /api/documents/{id}", &headers);
    if !b.exists(&id) {
        return not_found("Document");
    }
    if let Some(content) = body["content"].as_str() {
        b.versions.lock().unwrap().push(content.to_string());
    }
    (StatusCode::OK, Json(b.document()))
}

async fn list_versions(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.record("GET /api/documents/{id}/versions", &headers);
    if !b.exists(&id) {
        return not_found("Document");
    }
    let list: Vec<Value> = b
        .versions
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, content)| version_json(&id, i + 1, content))
        .collect();
    (StatusCode::OK, Json(Value::Array(list)))
}

async fn get_version(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path((id, n)): Path<(String, usize)>,
) -> Reply {
    b.record("GET /api/documents/{id}/versions/{n}", &headers);
    let versions = b.versions.lock().unwrap().clone();
    match versions.get(n.wrapping_sub(1)) {
        Some(content) if b.exists(&id) => (StatusCode::OK, Json(version_json(&id, n, content))),
        _ => not_found("Version"),
    }
}

fn embedding_json(doc_id: &str, index: usize, text: &str) -> Value {
    json!({
        "id": format!("{doc_id}-chunk-{index}"),
        "doc_id": doc_id,
        "chunk_text": text,
        "chunk_index": index,
        "vector_id": format!("vec-{doc_id}-{index}"),
        "created_at": TIMESTAMP,
    })
}

async fn create_embeddings(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    b.record("POST /api/embeddings/create", &headers);
    let doc_id = body["doc_id"].as_str().unwrap_or_default().to_string();
    let texts: Vec<String> = match body["chunks"].as_array() {
        Some(chunks) => chunks.iter().filter_map(|c| c.as_str()).map(str::to_string).collect(),
        None => body["text"].as_str().map(str::to_string).into_iter().collect(),
    };

    let mut chunks = b.chunks.lock().unwrap();
    let first = chunks.iter().filter(|(doc, _)| *doc == doc_id).count();
    let vector_ids: Vec<String> = (first..first + texts.len())
        .map(|i| format!("vec-{doc_id}-{i}"))
        .collect();
    chunks.extend(texts.into_iter().map(|text| (doc_id.clone(), text)));
    (
        StatusCode::OK,
        Json(json!({
            "message": "Embeddings created",
            "doc_id": doc_id,
            "chunks_count": vector_ids.len(),
            "vector_ids": vector_ids,
        })),
    )
}

async fn document_embeddings(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.record("GET /api/embeddings/doc/{id}", &headers);
    let list: Vec<Value> = b
        .chunks
        .lock()
        .unwrap()
        .iter()
        .filter(|(doc, _)| *doc == id)
        .enumerate()
        .map(|(i, (_, text))| embedding_json(&id, i, text))
        .collect();
    (StatusCode::OK, Json(Value::Array(list)))
}

async fn delete_embeddings(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    b.record("DELETE /api/embeddings/doc/{id}", &headers);
    let mut chunks = b.chunks.lock().unwrap();
    let before = chunks.len();
    chunks.retain(|(doc, _)| *doc != id);
    (
        StatusCode::OK,
        Json(json!({
            "message": "Embeddings deleted",
            "doc_id": id,
            "deleted_count": before - chunks.len(),
        })),
    )
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

pub fn workspace_with(base_url: &str, tokens: Arc<dyn TokenStore>) -> Workspace {
    let client = ApiClient::new(base_url, Duration::from_secs(5), tokens).unwrap();
    Workspace::new(client, fast_retry(), StaleTimes::default())
}

pub fn workspace(base_url: &str) -> Workspace {
    workspace_with(base_url, Arc::new(MemoryTokenStore::new(None)))
}
