//! Live milestone feed contract.
//!
//! A feed turns a [`MilestoneQuery`] into a cancellable stream of
//! [`FeedEnvelope`]s. Every push is tagged with the [`SubscriptionHandle`] that
//! produced it so consumers can drop results from superseded subscriptions.
//! Handles are owned by whoever called [`MilestoneFeed::subscribe`]; there is
//! no feed-wide "current subscription".

mod memory;

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{Address, PageWindow, ResultPage, StatusTab};

pub use memory::InMemoryMilestoneFeed;

/// Errors reported by a milestone feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Milestone feed is unavailable: {0}")]
    Unavailable(String),
    #[error("Milestone feed reported an error: {0}")]
    Remote(String),
    #[error("Subscription controller has been torn down")]
    Disposed,
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Parameters of one live "my milestones" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneQuery {
    pub tab: StatusTab,
    pub owner: Address,
    pub recipient: Address,
    pub window: PageWindow,
}

/// Opaque token for one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Result(ResultPage),
    Error(FeedError),
}

/// A push tagged with the subscription it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEnvelope {
    pub handle: SubscriptionHandle,
    pub event: FeedEvent,
}

impl FeedEnvelope {
    #[must_use]
    pub const fn result(handle: SubscriptionHandle, page: ResultPage) -> Self {
        Self {
            handle,
            event: FeedEvent::Result(page),
        }
    }

    #[must_use]
    pub const fn error(handle: SubscriptionHandle, error: FeedError) -> Self {
        Self {
            handle,
            event: FeedEvent::Error(error),
        }
    }
}

/// One live subscription: its handle plus the stream of pushes.
///
/// Dropping the subscription closes the stream; buffered pushes go with it.
#[derive(Debug)]
pub struct FeedSubscription {
    pub handle: SubscriptionHandle,
    pub events: mpsc::UnboundedReceiver<FeedEnvelope>,
}

/// Backend collaborator serving live milestone queries.
pub trait MilestoneFeed: Send + Sync {
    /// Open a live subscription for `query`.
    fn subscribe(&self, query: &MilestoneQuery) -> FeedResult<FeedSubscription>;

    /// Tear down `handle`. Unknown or already closed handles are a no-op.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}
