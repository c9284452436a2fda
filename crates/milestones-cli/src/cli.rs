use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "milestones")]
#[command(about = "Browse the milestones you own or receive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Where milestones and view settings come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON file with the milestone records (falls back to MILESTONES_DATA)
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Optional JSON view configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one page of your milestones
    List {
        /// Your address
        #[arg(long)]
        address: String,
        /// Status tab to show
        #[arg(short, long, default_value = "active")]
        status: String,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Act as a signed-out visitor
        #[arg(long)]
        anonymous: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how many milestones each status tab holds
    Tabs {
        /// Your address
        #[arg(long)]
        address: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
