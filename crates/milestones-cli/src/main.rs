//! Milestones CLI - browse your milestones from the command line
//!
//! Drives the same view core as the graphical clients against a JSON-backed
//! in-memory feed.

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::list::run_list;
use crate::commands::tabs::run_tabs;
use crate::error::CliError;

/// Log directives used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "milestones_cli=info,milestones_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            address,
            status,
            page,
            anonymous,
            json,
        } => {
            run_list(&cli.source, &address, &status, page, anonymous, json).await?;
        }
        Commands::Tabs { address, json } => run_tabs(&cli.source, &address, json).await?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
