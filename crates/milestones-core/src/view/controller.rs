//! Subscription controller: owns at most one live feed subscription.

use std::sync::Arc;

use crate::feed::{
    FeedEnvelope, FeedError, FeedResult, FeedSubscription, MilestoneFeed, MilestoneQuery,
    SubscriptionHandle,
};

/// Keeps a single live subscription and enforces stop-before-start.
///
/// The controller is either idle or holds exactly one [`FeedSubscription`].
/// Whether that subscription has delivered its first push yet is tracked by
/// the reconciler, not here.
pub struct SubscriptionController<F: MilestoneFeed> {
    feed: Arc<F>,
    live: Option<FeedSubscription>,
    disposed: bool,
}

impl<F: MilestoneFeed> SubscriptionController<F> {
    pub const fn new(feed: Arc<F>) -> Self {
        Self {
            feed,
            live: None,
            disposed: false,
        }
    }

    /// Replace the live subscription with one for `query`.
    ///
    /// The previous subscription is torn down before the feed is asked for a
    /// new one. On failure the controller stays idle.
    pub fn start(&mut self, query: &MilestoneQuery) -> FeedResult<SubscriptionHandle> {
        if self.disposed {
            return Err(FeedError::Disposed);
        }
        self.stop();

        let subscription = self.feed.subscribe(query).inspect_err(|error| {
            tracing::warn!("Failed to subscribe to {} milestones: {error}", query.tab);
        })?;
        let handle = subscription.handle;
        self.live = Some(subscription);
        Ok(handle)
    }

    /// Tear down the live subscription, if any. Returns the stopped handle.
    pub fn stop(&mut self) -> Option<SubscriptionHandle> {
        let subscription = self.live.take()?;
        let handle = subscription.handle;
        self.feed.unsubscribe(handle);
        tracing::debug!("Stopped {handle}");
        Some(handle)
    }

    /// Final shutdown: stop and refuse any further `start`.
    pub fn teardown(&mut self) {
        self.stop();
        self.disposed = true;
    }

    pub fn active_handle(&self) -> Option<SubscriptionHandle> {
        self.live.as_ref().map(|subscription| subscription.handle)
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Wait for the next push of the live subscription.
    ///
    /// Returns `None` when idle or when the feed closed the stream.
    pub async fn next_event(&mut self) -> Option<FeedEnvelope> {
        let subscription = self.live.as_mut()?;
        let envelope = subscription.events.recv().await;
        if envelope.is_none() {
            tracing::debug!("Feed closed {}", subscription.handle);
            self.live = None;
        }
        envelope
    }

    /// Next already-buffered push, without waiting.
    pub fn try_next_event(&mut self) -> Option<FeedEnvelope> {
        self.live.as_mut()?.events.try_recv().ok()
    }
}

impl<F: MilestoneFeed> Drop for SubscriptionController<F> {
    fn drop(&mut self) {
        self.stop();
    }
}
