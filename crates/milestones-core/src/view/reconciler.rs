//! Applies feed pushes to the list state.

use serde::Serialize;

use crate::feed::{FeedEnvelope, FeedError, FeedEvent, SubscriptionHandle};
use crate::models::{Milestone, ResultPage};

/// Where the list is in its subscription lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No subscription requested.
    #[default]
    Idle,
    /// Waiting for the first push of this handle.
    Subscribing(SubscriptionHandle),
    /// Showing pushes of this handle.
    Active(SubscriptionHandle),
    /// The last start or push failed. `handle` is `None` when the
    /// subscription could not be opened at all.
    Errored {
        handle: Option<SubscriptionHandle>,
        message: String,
    },
    /// Torn down; nothing mutates the list anymore.
    Disposed,
}

impl LoadState {
    /// Handle whose pushes are currently accepted.
    pub const fn handle(&self) -> Option<SubscriptionHandle> {
        match self {
            Self::Subscribing(handle) | Self::Active(handle) => Some(*handle),
            Self::Errored { handle, .. } => *handle,
            Self::Idle | Self::Disposed => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Subscribing(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApplyOutcome {
    /// A result page replaced the list.
    Accepted,
    /// An error push ended loading; the previous list is kept.
    Failed,
    /// The push belonged to a superseded subscription.
    Discarded,
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListDisplay {
    NotLoaded,
    Loading,
    Empty,
    Rows,
    Failed,
}

#[derive(Debug, Default)]
pub struct ResultReconciler {
    state: LoadState,
    snapshot: Option<ResultPage>,
}

impl ResultReconciler {
    /// A new subscription was opened; only its pushes count from now on.
    pub fn begin(&mut self, handle: SubscriptionHandle) {
        if self.state != LoadState::Disposed {
            self.state = LoadState::Subscribing(handle);
        }
    }

    pub fn apply(&mut self, envelope: FeedEnvelope) -> ApplyOutcome {
        if self.state.handle() != Some(envelope.handle) {
            tracing::debug!("Discarding stale push from {}", envelope.handle);
            return ApplyOutcome::Discarded;
        }

        match envelope.event {
            FeedEvent::Result(page) => {
                self.snapshot = Some(page);
                self.state = LoadState::Active(envelope.handle);
                ApplyOutcome::Accepted
            }
            FeedEvent::Error(error) => {
                self.state = LoadState::Errored {
                    handle: Some(envelope.handle),
                    message: error.to_string(),
                };
                ApplyOutcome::Failed
            }
        }
    }

    /// The subscription could not be opened.
    pub fn fail_start(&mut self, error: &FeedError) {
        if self.state != LoadState::Disposed {
            self.state = LoadState::Errored {
                handle: None,
                message: error.to_string(),
            };
        }
    }

    /// Back to idle with nothing shown, after the subscription was stopped
    /// without replacement or the actor changed.
    pub fn reset(&mut self) {
        if self.state != LoadState::Disposed {
            self.state = LoadState::Idle;
            self.snapshot = None;
        }
    }

    pub fn dispose(&mut self) {
        self.state = LoadState::Disposed;
    }

    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    pub const fn snapshot(&self) -> Option<&ResultPage> {
        self.snapshot.as_ref()
    }

    pub fn items(&self) -> &[Milestone] {
        self.snapshot
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |page| page.total)
    }

    pub const fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn display(&self) -> ListDisplay {
        match (&self.state, &self.snapshot) {
            (LoadState::Subscribing(_), _) => ListDisplay::Loading,
            (LoadState::Errored { .. }, None) => ListDisplay::Failed,
            (_, None) => ListDisplay::NotLoaded,
            (_, Some(page)) if page.is_empty() => ListDisplay::Empty,
            (_, Some(_)) => ListDisplay::Rows,
        }
    }
}
