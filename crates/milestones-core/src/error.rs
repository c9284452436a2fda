//! Error types for milestones-core

use thiserror::Error;

use crate::auth::AuthError;
use crate::feed::FeedError;

/// Result type alias using milestones-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in milestones-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Live feed error
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
