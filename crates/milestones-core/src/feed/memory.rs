//! In-memory live feed

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::feed::{
    FeedEnvelope, FeedError, FeedResult, FeedSubscription, MilestoneFeed, MilestoneQuery,
    SubscriptionHandle,
};
use crate::models::{Milestone, MilestoneId, ResultPage};
use crate::util::compact_text;
use crate::Result;

/// Live feed over an in-memory milestone set.
///
/// Every mutation re-runs the query of each open subscription and pushes a
/// fresh snapshot, the way a server-side live query would.
pub struct InMemoryMilestoneFeed {
    inner: Mutex<FeedInner>,
}

struct FeedInner {
    milestones: Vec<Milestone>,
    subscribers: BTreeMap<SubscriptionHandle, Subscriber>,
    next_handle: u64,
    available: bool,
}

struct Subscriber {
    query: MilestoneQuery,
    sender: mpsc::UnboundedSender<FeedEnvelope>,
}

impl InMemoryMilestoneFeed {
    #[must_use]
    pub fn new(milestones: impl IntoIterator<Item = Milestone>) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                milestones: milestones.into_iter().collect(),
                subscribers: BTreeMap::new(),
                next_handle: 1,
                available: true,
            }),
        }
    }

    /// Build a feed from a JSON array of milestones.
    pub fn from_json(payload: &str) -> Result<Self> {
        let milestones: Vec<Milestone> = serde_json::from_str(payload)?;
        Ok(Self::new(milestones))
    }

    /// Evaluate `query` once without subscribing.
    pub fn snapshot(&self, query: &MilestoneQuery) -> ResultPage {
        evaluate(&self.lock().milestones, query)
    }

    /// Insert or replace a milestone and push fresh snapshots.
    pub fn upsert(&self, milestone: Milestone) {
        let mut inner = self.lock();
        match inner
            .milestones
            .iter()
            .position(|existing| existing.id == milestone.id)
        {
            Some(index) => inner.milestones[index] = milestone,
            None => inner.milestones.push(milestone),
        }
        inner.broadcast();
    }

    /// Remove a milestone. Returns whether it existed.
    pub fn remove(&self, id: &MilestoneId) -> bool {
        let mut inner = self.lock();
        let before = inner.milestones.len();
        inner.milestones.retain(|milestone| &milestone.id != id);
        let removed = inner.milestones.len() != before;
        if removed {
            inner.broadcast();
        }
        removed
    }

    /// Push an error to one subscription. Returns whether it was delivered.
    pub fn fail(&self, handle: SubscriptionHandle, message: &str) -> bool {
        let mut inner = self.lock();
        let Some(subscriber) = inner.subscribers.get(&handle) else {
            return false;
        };
        let envelope = FeedEnvelope::error(handle, FeedError::Remote(compact_text(message)));
        if subscriber.sender.send(envelope).is_ok() {
            true
        } else {
            inner.subscribers.remove(&handle);
            false
        }
    }

    /// Toggle whether new subscriptions are accepted.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Number of subscriptions still open on the feed side.
    pub fn live_subscriptions(&self) -> usize {
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|_, subscriber| !subscriber.sender.is_closed());
        inner.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedInner {
    fn broadcast(&mut self) {
        let milestones = &self.milestones;
        self.subscribers.retain(|handle, subscriber| {
            let page = evaluate(milestones, &subscriber.query);
            let delivered = subscriber
                .sender
                .send(FeedEnvelope::result(*handle, page))
                .is_ok();
            if !delivered {
                tracing::debug!("Pruning closed subscription {handle}");
            }
            delivered
        });
    }
}

impl MilestoneFeed for InMemoryMilestoneFeed {
    fn subscribe(&self, query: &MilestoneQuery) -> FeedResult<FeedSubscription> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(FeedError::Unavailable(
                "feed is not accepting subscriptions".to_string(),
            ));
        }

        let handle = SubscriptionHandle::from_raw(inner.next_handle);
        inner.next_handle += 1;

        let (sender, events) = mpsc::unbounded_channel();
        let initial = evaluate(&inner.milestones, query);
        // Receiver is alive here, so the initial snapshot cannot fail to send.
        let _ = sender.send(FeedEnvelope::result(handle, initial));

        inner.subscribers.insert(
            handle,
            Subscriber {
                query: query.clone(),
                sender,
            },
        );
        tracing::debug!(
            "Opened {handle} for {} page {} (size {})",
            query.tab,
            query.window.offset,
            query.window.size
        );

        Ok(FeedSubscription { handle, events })
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self.lock().subscribers.remove(&handle).is_some() {
            tracing::debug!("Closed {handle}");
        }
    }
}

fn evaluate(milestones: &[Milestone], query: &MilestoneQuery) -> ResultPage {
    let mut matching = milestones
        .iter()
        .filter(|milestone| query.tab.matches(milestone.status))
        .filter(|milestone| {
            milestone.owner_address == query.owner
                || milestone.recipient_address == query.recipient
        })
        .collect::<Vec<_>>();
    matching.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let total = matching.len();
    let items = matching
        .into_iter()
        .skip(query.window.skip())
        .take(query.window.size)
        .cloned()
        .collect();

    ResultPage {
        items,
        size: query.window.size,
        offset: query.window.offset,
        total,
    }
}
