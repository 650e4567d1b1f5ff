//! # 쿼리 캐시
//!
//! 이미 받아온 응답을 `QueryKey`별로 보관하는 읽기 관통(read-through) 캐시입니다.
//! 각 항목은 값과 받아온 시각을 가지며, 호출하는 쪽이 넘긴 유효 시간(stale time)이
//! 지나면 다음 조회에서 다시 가져옵니다.
//!
//! 무효화는 자동으로 일어나지 않습니다. 쓰기 작업(문서 수정/삭제, 임베딩 생성 등)을 한
//! 쪽에서 `invalidate()`나 `remove()`를 `QueryScope`와 함께 직접 호출해야 합니다.
//!
//! 실패한 조회 결과는 캐시하지 않습니다.

use std::{
    any::Any,
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    error::ClientError,
    models::{EmbeddingSearchRequest, ListDocumentsParams},
};

/// 캐시 키. 엔드포인트 하나의 응답 하나에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AuthMe,
    DocumentList(ListDocumentsParams),
    DocumentDetail(String),
    VersionList(String),
    Version(String, i64),
    EmbeddingsByDocument(String),
    EmbeddingSearch(EmbeddingSearchRequest),
}

/// 무효화/삭제 범위. 하나의 범위가 여러 키에 걸칩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    All,
    Auth,
    /// 문서 목록, 상세, 버전 전부
    Documents,
    /// 모든 페이지의 문서 목록
    DocumentLists,
    /// 문서 하나의 상세 + 버전 목록 + 개별 버전
    Document(String),
    /// 문서 하나의 버전 목록 + 개별 버전
    Versions(String),
    /// 모든 임베딩 조회와 검색 결과
    Embeddings,
    EmbeddingsForDocument(String),
}

impl QueryScope {
    pub fn matches(&self, key: &QueryKey) -> bool {
        use QueryKey as K;

        match self {
            QueryScope::All => true,
            QueryScope::Auth => matches!(key, K::AuthMe),
            QueryScope::Documents => matches!(
                key,
                K::DocumentList(_) | K::DocumentDetail(_) | K::VersionList(_) | K::Version(..)
            ),
            QueryScope::DocumentLists => matches!(key, K::DocumentList(_)),
            QueryScope::Document(id) => match key {
                K::DocumentDetail(doc) | K::VersionList(doc) | K::Version(doc, _) => doc == id,
                _ => false,
            },
            QueryScope::Versions(id) => match key {
                K::VersionList(doc) | K::Version(doc, _) => doc == id,
                _ => false,
            },
            QueryScope::Embeddings => {
                matches!(key, K::EmbeddingsByDocument(_) | K::EmbeddingSearch(_))
            }
            QueryScope::EmbeddingsForDocument(id) => {
                matches!(key, K::EmbeddingsByDocument(doc) if doc == id)
            }
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn new(value: Arc<dyn Any + Send + Sync>, invalidated: bool) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            invalidated,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// 진행 중인 조회가 기다리는 동안 그 키에 무슨 일이 있었는지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStatus {
    Current,
    /// 도착한 결과를 오래된 것으로 저장합니다.
    Invalidated,
    /// 도착한 결과를 저장하지 않습니다.
    Removed,
}

struct InFlight {
    key: QueryKey,
    status: FetchStatus,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<u64, InFlight>,
    next_fetch: u64,
}

impl CacheState {
    fn mark_in_flight(&mut self, scope: &QueryScope, status: FetchStatus) {
        for fetch in self.in_flight.values_mut() {
            if scope.matches(&fetch.key) && fetch.status != FetchStatus::Removed {
                fetch.status = status;
            }
        }
    }
}

/// 진행 중인 조회 등록. 조회가 실패하거나 취소되어도 drop될 때 등록이 풀립니다.
struct FetchTicket<'a> {
    cache: &'a QueryCache,
    id: u64,
}

impl Drop for FetchTicket<'_> {
    fn drop(&mut self) {
        self.cache.lock().in_flight.remove(&self.id);
    }
}

#[derive(Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 유효 시간 안에 있고 무효화되지 않은 값만 돌려줍니다.
    pub fn get_fresh<T>(&self, key: &QueryKey, stale_time: Duration) -> Option<T>
    where
        T: Clone + 'static,
    {
        let state = self.lock();
        let entry = state.entries.get(key).filter(|e| e.is_fresh(stale_time))?;
        entry.value.downcast_ref::<T>().cloned()
    }

    /// 오래된 값이라도 있으면 돌려줍니다.
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.lock()
            .entries
            .get(key)
            .and_then(|e| e.value.downcast_ref::<T>().cloned())
    }

    pub fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.lock()
            .entries
            .insert(key, CacheEntry::new(Arc::new(value), false));
    }

    /// 신선한 캐시 값이 있으면 돌려주고, 없으면 `fetch`를 실행해 성공한 결과를 저장합니다.
    ///
    /// 잠금은 `fetch`를 기다리는 동안 잡고 있지 않습니다. 기다리는 사이에 키가
    /// 무효화되면 결과는 호출한 쪽에 그대로 돌려주되 오래된 값으로 저장하고,
    /// `remove()`나 `clear()`로 지워지면 저장하지 않습니다.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetch: F,
    ) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(value) = self.get_fresh::<T>(&key, stale_time) {
            tracing::debug!(?key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(?key, "Cache miss");
        let ticket = self.begin_fetch(&key);
        let value = fetch().await?;

        {
            let mut state = self.lock();
            let status = state
                .in_flight
                .remove(&ticket.id)
                .map_or(FetchStatus::Current, |in_flight| in_flight.status);
            match status {
                FetchStatus::Current => {
                    state
                        .entries
                        .insert(key, CacheEntry::new(Arc::new(value.clone()), false));
                }
                FetchStatus::Invalidated => {
                    tracing::debug!(?key, "Invalidated while fetching, stored as stale");
                    state
                        .entries
                        .insert(key, CacheEntry::new(Arc::new(value.clone()), true));
                }
                FetchStatus::Removed => {
                    tracing::debug!(?key, "Removed while fetching, result not stored");
                }
            }
        }
        Ok(value)
    }

    /// 범위에 속한 항목을 오래된 것으로 표시합니다. 값은 남아 있으므로 `get()`으로는 여전히 읽힙니다.
    /// 진행 중인 조회의 결과도 오래된 것으로 저장됩니다.
    pub fn invalidate(&self, scope: &QueryScope) -> usize {
        let mut state = self.lock();
        state.mark_in_flight(scope, FetchStatus::Invalidated);

        let mut count = 0;
        for (key, entry) in state.entries.iter_mut() {
            if scope.matches(key) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(?scope, count, "Invalidated cache entries");
        count
    }

    /// 범위에 속한 항목을 지웁니다. 진행 중인 조회의 결과도 저장하지 않습니다.
    pub fn remove(&self, scope: &QueryScope) -> usize {
        let mut state = self.lock();
        state.mark_in_flight(scope, FetchStatus::Removed);

        let before = state.entries.len();
        state.entries.retain(|key, _| !scope.matches(key));
        let count = before - state.entries.len();
        tracing::debug!(?scope, count, "Removed cache entries");
        count
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.mark_in_flight(&QueryScope::All, FetchStatus::Removed);
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn begin_fetch(&self, key: &QueryKey) -> FetchTicket<'_> {
        let mut state = self.lock();
        let id = state.next_fetch;
        state.next_fetch += 1;
        state.in_flight.insert(
            id,
            InFlight {
                key: key.clone(),
                status: FetchStatus::Current,
            },
        );
        FetchTicket { cache: self, id }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
