//! # docspace 명령줄 도구 진입점
//!
//! 문서 워크스페이스 백엔드에 접속해 버전 기록을 보고 두 버전을 나란히 비교합니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화 (표준 에러로 출력, 표준 출력은 결과 전용)
//! 3. 설정 로딩과 토큰 보관소 선택
//! 4. 하위 명령 실행: `versions`, `diff`, `login`, `whoami`, `logout`

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use docspace::{
    api::{FileTokenStore, TokenStore},
    models::UserLogin,
    versions::{presenter, ComparisonSession, LineTone, PanelRow, ViewModel, ViewState},
    Config, Workspace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 왼쪽 패널 폭의 상한 (문자 수)
const MAX_COLUMN_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "docspace", version, about = "Browse and compare document versions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 문서의 버전 타임라인 (최신순)
    Versions { doc_id: String },
    /// 두 버전을 나란히 비교. 생략하면 최신 두 버전을 비교합니다.
    Diff {
        doc_id: String,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long)]
        to: Option<i64>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Whoami,
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 결과는 stdout, 로그는 stderr로 나눠서 파이프로 넘겨도 섞이지 않게 합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docspace=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let tokens = config
        .token_path
        .as_ref()
        .map(|path| Arc::new(FileTokenStore::new(path)) as Arc<dyn TokenStore>);
    let persistent = tokens.is_some();
    let workspace = Workspace::from_config(&config, tokens)?;
    tracing::debug!("Using API at {}", workspace.client().base_url());

    match cli.command {
        Command::Versions { doc_id } => show_versions(&workspace, &doc_id).await,
        Command::Diff { doc_id, from, to } => show_diff(&workspace, &doc_id, from, to).await,
        Command::Login { email, password } => {
            let response = workspace.login(&UserLogin { email, password }).await?;
            match response.user {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
                None => println!("Signed in"),
            }
            if !persistent {
                tracing::warn!("DOCSPACE_TOKEN_PATH is not set; the token will not be kept");
            }
            Ok(())
        }
        Command::Whoami => {
            match workspace.current_user().await? {
                Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::Logout => {
            workspace.logout().await?;
            println!("Signed out");
            Ok(())
        }
    }
}

async fn show_versions(workspace: &Workspace, doc_id: &str) -> Result<()> {
    let versions = workspace.versions(doc_id).await?;
    if versions.is_empty() {
        println!("No versions yet");
        return Ok(());
    }

    for entry in presenter::timeline(&versions, Utc::now()) {
        let marker = if entry.is_latest { "*" } else { " " };
        println!(
            "{} {:<40} {} by {}",
            marker, entry.label, entry.updated, entry.updated_by
        );
    }
    Ok(())
}

/// 직접 지정한 번호는 목록이 도착하기 전에 골라 두고, 목록이 오면 한 번에 비교합니다.
async fn show_diff(workspace: &Workspace, doc_id: &str, from: Option<i64>, to: Option<i64>) -> Result<()> {
    let mut session = ComparisonSession::new();
    let ticket = session.select_document(doc_id);
    if let Some(n) = from {
        session.pick_from(n);
    }
    if let Some(n) = to {
        session.pick_to(n);
    }

    if let Some(result) =
        ComparisonSession::fetch_versions(workspace, &ticket, session.subscribe()).await
    {
        session.apply_versions(&ticket, result);
    }
    if let Some(ticket) = session.comparison_ticket() {
        if let Some((from, to)) =
            ComparisonSession::fetch_comparison(workspace, &ticket, session.subscribe()).await
        {
            session.apply_comparison(&ticket, from, to);
        }
    }

    match session.state() {
        ViewState::ComparisonReady {
            selection, view, ..
        } => {
            if selection.is_self_comparison() {
                println!("Only one version to compare (v{})", selection.to);
            }
            print!("{}", render(view));
            Ok(())
        }
        ViewState::NoVersions => {
            println!("No versions yet");
            Ok(())
        }
        ViewState::VersionUnavailable { version_number, .. } => {
            bail!("Version v{} is not available for this document", version_number)
        }
        ViewState::SignInRequired => bail!("Sign in required. Run `docspace login` first"),
        ViewState::LoadFailed { stage, message, .. } => {
            bail!("Failed to load {:?}: {}", stage, message)
        }
        other => bail!("Comparison did not complete: {:?}", other),
    }
}

fn marker(tone: LineTone) -> char {
    match tone {
        LineTone::Neutral => ' ',
        LineTone::Positive => '+',
        LineTone::Negative => '-',
        LineTone::Warning => '~',
    }
}

fn cell(row: &PanelRow) -> String {
    if row.present {
        format!("{} {}", marker(row.tone), row.text)
    } else {
        marker(row.tone).to_string()
    }
}

/// 두 패널을 좌우로 붙인 텍스트. 마지막 줄은 집계입니다.
fn render(view: &ViewModel) -> String {
    let width = view
        .from
        .rows
        .iter()
        .map(|row| cell(row).chars().count())
        .chain([view.from.title.len() + view.from.badge.len() + 1])
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH);

    let mut out = String::new();
    let header = format!("{} {}", view.from.title, view.from.badge);
    out.push_str(&format!(
        "{:<width$} | {} {}\n",
        header, view.to.title, view.to.badge
    ));
    out.push_str(&format!("{}-+-{}\n", "-".repeat(width), "-".repeat(width)));

    for (left, right) in view.paired_rows() {
        let left: String = cell(left).chars().take(width).collect();
        let line = format!("{:<width$} | {}", left, cell(right));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let stats = &view.stats;
    out.push_str(&format!(
        "{} rows: {} unchanged, {} changed, {} added, {} removed\n",
        stats.rows, stats.unchanged, stats.changed, stats.added, stats.removed
    ));
    out
}
