use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] milestones_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Not logged in. Drop --anonymous to load your milestones.")]
    NotLoggedIn,
    #[error("No milestone data configured. Pass --data or set MILESTONES_DATA.")]
    DataNotConfigured,
    #[error("Timed out waiting for the milestone feed")]
    Timeout,
    #[error("Milestone feed closed before delivering a page")]
    FeedClosed,
    #[error("Milestone feed failed: {0}")]
    FeedFailed(String),
}
