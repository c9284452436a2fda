use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use milestones_core::auth::StaticAuthGate;
use milestones_core::feed::InMemoryMilestoneFeed;
use milestones_core::presentation::{MilestoneRow, PaginationSummary, TabView};
use milestones_core::util::normalize_text_option;
use milestones_core::view::{ApplyOutcome, LoadOutcome, LoadState};
use milestones_core::{Address, Identity, MyMilestonesView, StatusTab, ViewConfig};
use serde::Serialize;

use crate::cli::SourceArgs;
use crate::error::CliError;

pub const DATA_PATH_ENV: &str = "MILESTONES_DATA";
const FEED_TIMEOUT: Duration = Duration::from_secs(5);

pub type CliView = MyMilestonesView<InMemoryMilestoneFeed, StaticAuthGate>;

#[derive(Debug, Serialize)]
pub struct MilestonePageOutput {
    pub address: String,
    pub tab: StatusTab,
    pub pagination: Option<PaginationSummary>,
    pub rows: Vec<MilestoneRow>,
}

#[derive(Debug, Serialize)]
pub struct TabCountItem {
    pub tab: StatusTab,
    pub total: usize,
}

pub fn resolve_data_path(
    cli_path: Option<PathBuf>,
    env_path: Option<String>,
) -> Result<PathBuf, CliError> {
    cli_path
        .or_else(|| normalize_text_option(env_path).map(PathBuf::from))
        .ok_or(CliError::DataNotConfigured)
}

pub fn load_config(path: Option<&Path>) -> Result<ViewConfig, CliError> {
    let config = match path {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

pub fn load_feed(path: &Path) -> Result<Arc<InMemoryMilestoneFeed>, CliError> {
    let payload = std::fs::read_to_string(path)?;
    let feed = InMemoryMilestoneFeed::from_json(&payload)?;
    tracing::debug!("Loaded milestone data from {}", path.display());
    Ok(Arc::new(feed))
}

pub fn build_identity(address: &str, anonymous: bool) -> Result<Identity, CliError> {
    let address = Address::new(address)?;
    Ok(if anonymous {
        Identity::anonymous(address)
    } else {
        Identity::authenticated(address)
    })
}

/// Build the view from CLI source flags and mount it for `identity`.
pub async fn open_view(source: &SourceArgs, identity: Identity) -> Result<CliView, CliError> {
    let data_path = resolve_data_path(source.data.clone(), env::var(DATA_PATH_ENV).ok())?;
    let config = load_config(source.config.as_deref())?;
    let feed = load_feed(&data_path)?;

    let mut view = MyMilestonesView::new(feed, StaticAuthGate, config);
    let outcome = view.mount(identity).await;
    ensure_subscribed(outcome, &view)?;
    Ok(view)
}

pub fn ensure_subscribed(outcome: LoadOutcome, view: &CliView) -> Result<(), CliError> {
    match outcome {
        LoadOutcome::Subscribed | LoadOutcome::Skipped => Ok(()),
        LoadOutcome::AuthRequired => Err(CliError::NotLoggedIn),
        LoadOutcome::StartFailed => Err(CliError::FeedFailed(state_message(view.state()))),
    }
}

/// Wait until the live subscription delivers a page.
pub async fn wait_for_page(view: &mut CliView) -> Result<(), CliError> {
    loop {
        let update = tokio::time::timeout(FEED_TIMEOUT, view.next_update())
            .await
            .map_err(|_| CliError::Timeout)?;
        match update {
            Some(ApplyOutcome::Accepted) => return Ok(()),
            Some(ApplyOutcome::Failed) => {
                return Err(CliError::FeedFailed(state_message(view.state())));
            }
            Some(ApplyOutcome::Discarded) => {}
            None => return Err(CliError::FeedClosed),
        }
    }
}

fn state_message(state: &LoadState) -> String {
    match state {
        LoadState::Errored { message, .. } => message.clone(),
        other => format!("{other:?}"),
    }
}

pub fn format_tab_line(tabs: &[TabView]) -> String {
    tabs.iter()
        .map(|tab| {
            if tab.active {
                format!("[{}]", tab.label)
            } else {
                tab.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn format_row_lines(rows: &[MilestoneRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let mut status = row.status.clone();
            if row.in_flight {
                status.insert_str(0, "~ ");
            }
            if row.review_due {
                status.insert_str(0, "! ");
            }
            let reviewer = row.reviewer.as_deref().unwrap_or("-");
            format!(
                "{:<14}  {:<38}  {:<16}  {:>12}  {:>4}  {:>12}  {}",
                row.created,
                row.title,
                status,
                row.requested,
                row.donation_count,
                row.donated,
                reviewer
            )
        })
        .collect()
}

pub fn format_pagination_line(summary: &PaginationSummary) -> Option<String> {
    if !summary.show_control {
        return None;
    }
    let pages = summary
        .visible_pages()
        .map(|page| {
            if page == summary.active_page {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!("{}  {pages}", summary.label()))
}
