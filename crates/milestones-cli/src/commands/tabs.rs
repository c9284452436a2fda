use milestones_core::StatusTab;

use crate::cli::SourceArgs;
use crate::commands::common::{
    build_identity, ensure_subscribed, open_view, wait_for_page, CliView, TabCountItem,
};
use crate::error::CliError;

pub async fn run_tabs(source: &SourceArgs, address: &str, as_json: bool) -> Result<(), CliError> {
    let identity = build_identity(address, false)?;
    let mut view = open_view(source, identity).await?;
    let counts = collect_tab_counts(&mut view).await?;
    view.teardown();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        for item in counts {
            println!("{:<10} {}", item.tab.label(), item.total);
        }
    }

    Ok(())
}

/// Walk every tab in order and record its total.
pub async fn collect_tab_counts(view: &mut CliView) -> Result<Vec<TabCountItem>, CliError> {
    let mut counts = Vec::with_capacity(StatusTab::ALL.len());
    for tab in StatusTab::ALL {
        let outcome = view.set_filter(tab);
        ensure_subscribed(outcome, view)?;
        if view.is_loading() {
            wait_for_page(view).await?;
        }
        counts.push(TabCountItem {
            tab,
            total: view.total(),
        });
    }
    Ok(counts)
}
