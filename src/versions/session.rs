//! # 버전 비교 화면 상태 머신
//!
//! ```text
//! NoDocumentSelected ──select_document──▶ LoadingVersions
//! LoadingVersions ──apply_versions──▶ NoVersions | VersionsLoaded | LoadFailed | SignInRequired
//! VersionsLoaded ──apply_comparison──▶ ComparisonReady | VersionUnavailable | LoadFailed | SignInRequired
//! (어디서든) pick_from / pick_to ──▶ VersionsLoaded
//! (어디서든) select_document ──▶ LoadingVersions,  clear_document ──▶ NoDocumentSelected
//! ```
//!
//! ## 오래된 응답 처리 (마지막 선택 우선)
//! 선택이 바뀔 때마다 세대(generation) 번호가 올라갑니다. 요청을 시작할 때 받은 티켓의
//! 세대가 현재 세대와 다르면 응답이 도착해도 적용하지 않고 버립니다.
//! 같은 번호가 `watch` 채널로도 전파되므로, 진행 중인 조회는 `fetch_*` 안에서
//! 도착을 기다리지 않고 바로 취소됩니다.
//!
//! 이 구조체는 UI 이벤트 루프 하나가 소유합니다. 조회는 `fetch_*`로 따로 실행하고
//! 결과만 `apply_*`로 넘기면 되므로, 조회가 끝나기 전에도 다른 선택을 받을 수 있습니다.

use tokio::sync::watch;

use super::{
    diff::{compare_versions, ComparisonResult},
    presenter::{present, ViewModel},
    repository::VersionRepository,
    selection::{Selector, VersionSelection},
};
use crate::{
    error::{ClientError, ErrorKind},
    models::DocumentVersion,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Versions,
    Comparison,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    NoDocumentSelected,
    LoadingVersions,
    /// 문서에 버전이 하나도 없음 (에러가 아닌 빈 상태)
    NoVersions,
    /// 비교할 두 버전이 정해졌고 스냅샷을 불러오는 중
    VersionsLoaded { selection: VersionSelection },
    ComparisonReady {
        selection: VersionSelection,
        comparison: ComparisonResult,
        view: ViewModel,
    },
    /// 선택한 버전 번호의 기록이 없음 (예: 동시에 삭제됨)
    VersionUnavailable {
        selection: VersionSelection,
        version_number: i64,
    },
    /// 재시도 가능한 실패
    LoadFailed {
        stage: LoadStage,
        kind: ErrorKind,
        message: String,
    },
    /// 로그인 화면으로 넘겨야 함. 로컬에서는 재시도하지 않습니다.
    SignInRequired,
}

/// 버전 목록 조회 티켓
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub document_id: String,
}

/// 두 스냅샷 조회 티켓
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTicket {
    pub generation: u64,
    pub document_id: String,
    pub selection: VersionSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// 더 새로운 선택이 있어 버림
    Discarded,
}

/// 다음에 실행해야 할 조회
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingLoad {
    Versions(FetchTicket),
    Comparison(ComparisonTicket),
}

pub struct ComparisonSession {
    state: ViewState,
    selector: Selector,
    versions: Vec<DocumentVersion>,
    generation: u64,
    superseded: watch::Sender<u64>,
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonSession {
    pub fn new() -> Self {
        let (superseded, _) = watch::channel(0);
        Self {
            state: ViewState::NoDocumentSelected,
            selector: Selector::new(),
            versions: Vec::new(),
            generation: 0,
            superseded,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn document_id(&self) -> Option<&str> {
        self.selector.document_id()
    }

    /// 현재 문서의 버전 목록 (최신순). 아직 불러오지 않았으면 비어 있습니다.
    pub fn versions(&self) -> &[DocumentVersion] {
        &self.versions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 이후 선택 변경을 감지하는 수신기. `fetch_*`에 넘깁니다.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.superseded.subscribe()
    }

    pub fn view(&self) -> Option<&ViewModel> {
        match &self.state {
            ViewState::ComparisonReady { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn select_document(&mut self, document_id: &str) -> FetchTicket {
        let generation = self.bump();
        // 같은 문서를 다시 고르면 직접 고른 값은 유지하고 목록만 새로 받습니다.
        self.selector.select_document(document_id);
        self.versions.clear();
        self.state = ViewState::LoadingVersions;
        tracing::debug!(document_id, generation, "Document selected");

        FetchTicket {
            generation,
            document_id: document_id.to_string(),
        }
    }

    pub fn clear_document(&mut self) {
        self.bump();
        self.selector.clear();
        self.versions.clear();
        self.state = ViewState::NoDocumentSelected;
    }

    pub fn apply_versions(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<DocumentVersion>, ClientError>,
    ) -> ApplyOutcome {
        if !self.is_current(ticket.generation, &ticket.document_id) {
            tracing::debug!(
                document_id = %ticket.document_id,
                generation = ticket.generation,
                "Discarding stale version list"
            );
            return ApplyOutcome::Discarded;
        }

        match result {
            Ok(mut versions) => {
                versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
                self.versions = versions;
                self.state = self.resolve_selection();
            }
            Err(e) => self.state = failure_state(LoadStage::Versions, &e),
        }
        ApplyOutcome::Applied
    }

    /// 현재 상태가 `VersionsLoaded`이면 스냅샷 조회 티켓을 돌려줍니다.
    pub fn comparison_ticket(&self) -> Option<ComparisonTicket> {
        match (&self.state, self.selector.document_id()) {
            (ViewState::VersionsLoaded { selection }, Some(document_id)) => Some(ComparisonTicket {
                generation: self.generation,
                document_id: document_id.to_string(),
                selection: *selection,
            }),
            _ => None,
        }
    }

    /// `from` 쪽 버전을 직접 고릅니다.
    ///
    /// 버전 목록이 아직 없으면 선택만 기억하고(진행 중인 목록 조회는 유지) `None`을 돌려줍니다.
    pub fn pick_from(&mut self, version_number: i64) -> Option<ComparisonTicket> {
        self.selector.pick_from(version_number);
        self.reselect()
    }

    pub fn pick_to(&mut self, version_number: i64) -> Option<ComparisonTicket> {
        self.selector.pick_to(version_number);
        self.reselect()
    }

    pub fn apply_comparison(
        &mut self,
        ticket: &ComparisonTicket,
        from: Result<DocumentVersion, ClientError>,
        to: Result<DocumentVersion, ClientError>,
    ) -> ApplyOutcome {
        if !self.is_current(ticket.generation, &ticket.document_id) {
            tracing::debug!(
                document_id = %ticket.document_id,
                generation = ticket.generation,
                "Discarding stale comparison"
            );
            return ApplyOutcome::Discarded;
        }

        let selection = ticket.selection;
        self.state = match (from, to) {
            (Ok(from), Ok(to)) => {
                let comparison = compare_versions(&from, &to);
                let view = present(&comparison, selection.from, selection.to);
                ViewState::ComparisonReady {
                    selection,
                    comparison,
                    view,
                }
            }
            (Err(e), _) => snapshot_failure(selection, selection.from, &e),
            (_, Err(e)) => snapshot_failure(selection, selection.to, &e),
        };
        ApplyOutcome::Applied
    }

    /// 실패한 조회를 다시 시작합니다. `LoadFailed`가 아니면 `None`.
    pub fn retry(&mut self) -> Option<PendingLoad> {
        let ViewState::LoadFailed { stage, .. } = self.state else {
            return None;
        };
        let document_id = self.selector.document_id()?.to_string();

        match stage {
            LoadStage::Versions => Some(PendingLoad::Versions(self.select_document(&document_id))),
            LoadStage::Comparison => self.reselect().map(PendingLoad::Comparison),
        }
    }

    /// 버전 목록을 조회합니다. 조회 도중 선택이 바뀌면 기다리지 않고 `None`을 돌려줍니다.
    pub async fn fetch_versions<R>(
        repo: &R,
        ticket: &FetchTicket,
        cancel: watch::Receiver<u64>,
    ) -> Option<Result<Vec<DocumentVersion>, ClientError>>
    where
        R: VersionRepository + ?Sized,
    {
        until_superseded(cancel, ticket.generation, repo.list_versions(&ticket.document_id)).await
    }

    /// 두 스냅샷을 동시에 조회합니다. 같은 버전끼리 비교하면 한 번만 조회합니다.
    pub async fn fetch_comparison<R>(
        repo: &R,
        ticket: &ComparisonTicket,
        cancel: watch::Receiver<u64>,
    ) -> Option<(
        Result<DocumentVersion, ClientError>,
        Result<DocumentVersion, ClientError>,
    )>
    where
        R: VersionRepository + ?Sized,
    {
        let document_id = ticket.document_id.as_str();
        let VersionSelection { from, to } = ticket.selection;

        let fetch = async {
            if from == to {
                let version = repo.get_version(document_id, from).await;
                let copy = match &version {
                    Ok(v) => Ok(v.clone()),
                    Err(e) => Err(clone_error(e)),
                };
                (version, copy)
            } else {
                tokio::join!(
                    repo.get_version(document_id, from),
                    repo.get_version(document_id, to)
                )
            }
        };

        until_superseded(cancel, ticket.generation, fetch).await
    }

    /// 문서를 열고 버전 목록과 기본 비교까지 차례로 불러옵니다.
    pub async fn open_document<R>(&mut self, repo: &R, document_id: &str) -> &ViewState
    where
        R: VersionRepository + ?Sized,
    {
        let ticket = self.select_document(document_id);
        self.run(repo, PendingLoad::Versions(ticket)).await
    }

    pub async fn choose_from<R>(&mut self, repo: &R, version_number: i64) -> &ViewState
    where
        R: VersionRepository + ?Sized,
    {
        if let Some(ticket) = self.pick_from(version_number) {
            self.run(repo, PendingLoad::Comparison(ticket)).await;
        }
        &self.state
    }

    pub async fn choose_to<R>(&mut self, repo: &R, version_number: i64) -> &ViewState
    where
        R: VersionRepository + ?Sized,
    {
        if let Some(ticket) = self.pick_to(version_number) {
            self.run(repo, PendingLoad::Comparison(ticket)).await;
        }
        &self.state
    }

    pub async fn retry_load<R>(&mut self, repo: &R) -> &ViewState
    where
        R: VersionRepository + ?Sized,
    {
        if let Some(pending) = self.retry() {
            self.run(repo, pending).await;
        }
        &self.state
    }

    async fn run<R>(&mut self, repo: &R, mut pending: PendingLoad) -> &ViewState
    where
        R: VersionRepository + ?Sized,
    {
        loop {
            let cancel = self.subscribe();
            match pending {
                PendingLoad::Versions(ticket) => {
                    let Some(result) = Self::fetch_versions(repo, &ticket, cancel).await else {
                        break;
                    };
                    self.apply_versions(&ticket, result);
                    match self.comparison_ticket() {
                        Some(next) => pending = PendingLoad::Comparison(next),
                        None => break,
                    }
                }
                PendingLoad::Comparison(ticket) => {
                    if let Some((from, to)) = Self::fetch_comparison(repo, &ticket, cancel).await {
                        self.apply_comparison(&ticket, from, to);
                    }
                    break;
                }
            }
        }
        &self.state
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.superseded.send_replace(self.generation);
        self.generation
    }

    fn is_current(&self, generation: u64, document_id: &str) -> bool {
        generation == self.generation && self.selector.document_id() == Some(document_id)
    }

    /// 선택을 다시 계산하고, 비교할 수 있으면 새 세대의 티켓을 만듭니다.
    fn reselect(&mut self) -> Option<ComparisonTicket> {
        if self.versions.is_empty() {
            // 목록 조회 중이거나 빈 문서. 선택은 목록이 도착하면 반영됩니다.
            return None;
        }
        self.bump();
        self.state = self.resolve_selection();
        self.comparison_ticket()
    }

    fn resolve_selection(&self) -> ViewState {
        let Some(selection) = self.selector.resolve(&self.versions) else {
            return ViewState::NoVersions;
        };

        let missing = [selection.from, selection.to]
            .into_iter()
            .find(|n| !self.versions.iter().any(|v| v.version_number == *n));

        match missing {
            Some(version_number) => ViewState::VersionUnavailable {
                selection,
                version_number,
            },
            None => ViewState::VersionsLoaded { selection },
        }
    }
}

fn failure_state(stage: LoadStage, error: &ClientError) -> ViewState {
    match error.kind() {
        ErrorKind::Unauthorized => ViewState::SignInRequired,
        kind => {
            tracing::warn!(?stage, "Version load failed: {}", error);
            ViewState::LoadFailed {
                stage,
                kind,
                message: error.to_string(),
            }
        }
    }
}

fn snapshot_failure(selection: VersionSelection, version_number: i64, error: &ClientError) -> ViewState {
    match error.kind() {
        ErrorKind::NotFound => ViewState::VersionUnavailable {
            selection,
            version_number,
        },
        _ => failure_state(LoadStage::Comparison, error),
    }
}

// ClientError는 io::Error를 담을 수 있어 Clone이 아닙니다. 같은 분류와 메시지로 다시 만듭니다.
fn clone_error(error: &ClientError) -> ClientError {
    match error {
        ClientError::NotFound(m) => ClientError::NotFound(m.clone()),
        ClientError::Unauthorized(m) => ClientError::Unauthorized(m.clone()),
        ClientError::Network(m) => ClientError::Network(m.clone()),
        ClientError::Api { status, message } => ClientError::Api {
            status: *status,
            message: message.clone(),
        },
        ClientError::Decode(m) => ClientError::Decode(m.clone()),
        ClientError::InvalidConfig(m) => ClientError::InvalidConfig(m.clone()),
        ClientError::Io(e) => ClientError::Io(std::io::Error::new(e.kind(), e.to_string())),
    }
}

/// `fut`을 실행하되, 그 사이 세대가 바뀌면 즉시 `None`을 돌려줍니다.
async fn until_superseded<F>(
    mut cancel: watch::Receiver<u64>,
    generation: u64,
    fut: F,
) -> Option<F::Output>
where
    F: std::future::Future,
{
    if *cancel.borrow_and_update() != generation {
        return None;
    }

    tokio::select! {
        biased;
        _ = superseded(&mut cancel, generation) => {
            tracing::debug!(generation, "Fetch cancelled by newer selection");
            None
        }
        output = fut => Some(output),
    }
}

async fn superseded(cancel: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        if cancel.changed().await.is_err() {
            // 세션이 사라졌으면 취소할 주체도 없습니다.
            std::future::pending::<()>().await;
        }
        if *cancel.borrow_and_update() != generation {
            return;
        }
    }
}
