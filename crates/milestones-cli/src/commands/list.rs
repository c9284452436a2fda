use chrono::Utc;
use milestones_core::view::ListDisplay;
use milestones_core::StatusTab;

use crate::cli::SourceArgs;
use crate::commands::common::{
    build_identity, ensure_subscribed, format_pagination_line, format_row_lines,
    format_tab_line, open_view, wait_for_page, MilestonePageOutput,
};
use crate::error::CliError;

const EMPTY_STATE: &str = "No milestones here!";

pub async fn run_list(
    source: &SourceArgs,
    address: &str,
    status: &str,
    page: usize,
    anonymous: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let tab = status.parse::<StatusTab>()?;
    let identity = build_identity(address, anonymous)?;
    let mut view = open_view(source, identity).await?;
    wait_for_page(&mut view).await?;

    let outcome = view.set_filter(tab);
    ensure_subscribed(outcome, &view)?;
    if view.is_loading() {
        wait_for_page(&mut view).await?;
    }

    if page != 1 {
        let outcome = view.go_to_page(page)?;
        ensure_subscribed(outcome, &view)?;
        wait_for_page(&mut view).await?;
    }

    let rows = view.rows(Utc::now());
    let pagination = view.pagination();

    if as_json {
        let output = MilestonePageOutput {
            address: address.trim().to_ascii_lowercase(),
            tab: view.tab(),
            pagination,
            rows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_tab_line(&view.tabs()));
        println!();
        if view.display() == ListDisplay::Empty {
            println!("{EMPTY_STATE}");
        } else {
            for line in format_row_lines(&rows) {
                println!("{line}");
            }
        }
        if let Some(line) = pagination.as_ref().and_then(format_pagination_line) {
            println!();
            println!("{line}");
        }
    }

    view.teardown();
    Ok(())
}
