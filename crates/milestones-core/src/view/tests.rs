use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use super::*;
use crate::auth::StaticAuthGate;
use crate::feed::{FeedResult, FeedSubscription, InMemoryMilestoneFeed, MilestoneQuery};
use crate::models::{Address, MilestoneStatus, ResultPage};
use crate::test_support::{address, identity, milestone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Subscribe(u64),
    Unsubscribe(u64),
}

#[derive(Default)]
struct Recording {
    calls: Vec<Call>,
    queries: Vec<MilestoneQuery>,
    senders: BTreeMap<u64, mpsc::UnboundedSender<FeedEnvelope>>,
    live: BTreeSet<u64>,
    max_live: usize,
    next: u64,
    refuse: bool,
}

/// Feed that records calls and lets the test decide when pushes happen.
///
/// Senders are kept after unsubscribe so late pushes can be simulated.
#[derive(Default)]
struct RecordingFeed {
    inner: Mutex<Recording>,
}

impl RecordingFeed {
    fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn last_query(&self) -> MilestoneQuery {
        self.inner.lock().unwrap().queries.last().cloned().unwrap()
    }

    fn live(&self) -> usize {
        self.inner.lock().unwrap().live.len()
    }

    fn max_live(&self) -> usize {
        self.inner.lock().unwrap().max_live
    }

    fn refuse(&self, refuse: bool) {
        self.inner.lock().unwrap().refuse = refuse;
    }

    fn push(&self, raw: u64, page: ResultPage) -> bool {
        let handle = SubscriptionHandle::from_raw(raw);
        self.inner.lock().unwrap().senders[&raw]
            .send(FeedEnvelope::result(handle, page))
            .is_ok()
    }

    fn push_error(&self, raw: u64, message: &str) -> bool {
        let handle = SubscriptionHandle::from_raw(raw);
        self.inner.lock().unwrap().senders[&raw]
            .send(FeedEnvelope::error(
                handle,
                FeedError::Remote(message.to_string()),
            ))
            .is_ok()
    }
}

impl MilestoneFeed for RecordingFeed {
    fn subscribe(&self, query: &MilestoneQuery) -> FeedResult<FeedSubscription> {
        let mut inner = self.inner.lock().unwrap();
        if inner.refuse {
            return Err(FeedError::Unavailable("refused".to_string()));
        }
        inner.next += 1;
        let raw = inner.next;
        let (sender, events) = mpsc::unbounded_channel();
        inner.senders.insert(raw, sender);
        inner.live.insert(raw);
        inner.max_live = inner.max_live.max(inner.live.len());
        inner.calls.push(Call::Subscribe(raw));
        inner.queries.push(query.clone());
        Ok(FeedSubscription {
            handle: SubscriptionHandle::from_raw(raw),
            events,
        })
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.inner.lock().unwrap();
        if inner.live.remove(&handle.raw()) {
            inner.calls.push(Call::Unsubscribe(handle.raw()));
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    errors: Mutex<Vec<FeedError>>,
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &FeedError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

fn page(ids: &[&str], offset: usize, total: usize) -> ResultPage {
    ResultPage {
        items: ids
            .iter()
            .map(|id| milestone(id, MilestoneStatus::InProgress, "0xme", 0))
            .collect(),
        size: 10,
        offset,
        total,
    }
}

fn item_ids<F: MilestoneFeed, A: AuthGate>(view: &MyMilestonesView<F, A>) -> Vec<String> {
    view.items().iter().map(|m| m.id.to_string()).collect()
}

async fn recording_view() -> (
    Arc<RecordingFeed>,
    MyMilestonesView<RecordingFeed, StaticAuthGate>,
) {
    let feed = Arc::new(RecordingFeed::default());
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());
    assert_eq!(view.mount(identity("0xme")).await, LoadOutcome::Subscribed);
    (feed, view)
}

#[tokio::test]
async fn mount_subscribes_with_defaults() {
    let (feed, view) = recording_view().await;

    assert_eq!(
        feed.last_query(),
        MilestoneQuery {
            tab: StatusTab::Active,
            owner: address("0xme"),
            recipient: address("0xme"),
            window: PageWindow { offset: 0, size: 10 },
        }
    );
    assert!(view.is_loading());
    assert_eq!(view.display(), ListDisplay::Loading);
    assert_eq!(view.state(), &LoadState::Subscribing(SubscriptionHandle::from_raw(1)));
}

#[tokio::test]
async fn unauthenticated_mount_requests_nothing() {
    let feed = Arc::new(RecordingFeed::default());
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());

    let outcome = view.mount(Identity::anonymous(address("0xme"))).await;
    assert_eq!(outcome, LoadOutcome::AuthRequired);
    assert!(feed.calls().is_empty());
    assert_eq!(view.state(), &LoadState::Idle);
    assert_eq!(view.display(), ListDisplay::NotLoaded);
}

#[tokio::test]
async fn actions_after_failed_auth_request_nothing() {
    let feed = Arc::new(RecordingFeed::default());
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());
    view.mount(Identity::anonymous(address("0xme"))).await;

    assert_eq!(view.set_filter(StatusTab::Paid), LoadOutcome::AuthRequired);
    assert_eq!(view.set_page(1), LoadOutcome::AuthRequired);
    assert_eq!(view.go_to_page(3).unwrap(), LoadOutcome::AuthRequired);
    assert_eq!(view.reload(), LoadOutcome::AuthRequired);
    assert!(feed.calls().is_empty());
    assert_eq!(view.tab(), StatusTab::Paid);

    assert_eq!(view.set_identity(Some(identity("0xme"))).await, LoadOutcome::Subscribed);
    assert_eq!(feed.calls(), vec![Call::Subscribe(1)]);
    assert_eq!(feed.last_query().tab, StatusTab::Paid);
    assert_eq!(feed.last_query().window.offset, 0);
}

#[tokio::test]
async fn unauthenticated_identity_change_drops_subscription_and_rows() {
    let (feed, mut view) = recording_view().await;
    assert!(feed.push(1, page(&["mine"], 0, 1)));
    view.drain_pending();
    assert_eq!(item_ids(&view), vec!["mine"]);

    let outcome = view.set_identity(Some(Identity::anonymous(address("0xother")))).await;
    assert_eq!(outcome, LoadOutcome::AuthRequired);
    assert_eq!(feed.calls(), vec![Call::Subscribe(1), Call::Unsubscribe(1)]);
    assert_eq!(feed.live(), 0);
    assert!(view.items().is_empty());
    assert_eq!(view.display(), ListDisplay::NotLoaded);
    assert_eq!(view.set_filter(StatusTab::Paid), LoadOutcome::AuthRequired);
    assert_eq!(feed.live(), 0);
}

#[tokio::test]
async fn never_more_than_one_live_subscription() {
    let (feed, mut view) = recording_view().await;

    view.set_filter(StatusTab::Paid);
    view.set_page(3);
    view.set_page(3);
    view.reload();
    view.set_filter(StatusTab::Rejected);
    view.set_identity(Some(identity("0xother"))).await;
    view.go_to_page(2).unwrap();
    assert!(feed.live() <= 1);

    view.set_identity(None).await;
    assert_eq!(feed.live(), 0);
    assert_eq!(feed.max_live(), 1);
}

#[tokio::test]
async fn previous_subscription_stops_before_next_starts() {
    let (feed, mut view) = recording_view().await;

    view.set_filter(StatusTab::Paid);
    view.set_page(1);

    assert_eq!(
        feed.calls(),
        vec![
            Call::Subscribe(1),
            Call::Unsubscribe(1),
            Call::Subscribe(2),
            Call::Unsubscribe(2),
            Call::Subscribe(3),
        ]
    );
}

#[tokio::test]
async fn switching_filter_resets_offset() {
    let (feed, mut view) = recording_view().await;
    view.set_page(4);
    assert_eq!(feed.last_query().window.offset, 4);

    assert_eq!(view.set_filter(StatusTab::Canceled), LoadOutcome::Subscribed);
    assert_eq!(view.window().offset, 0);
    assert_eq!(feed.last_query().window.offset, 0);
    assert_eq!(feed.last_query().tab, StatusTab::Canceled);
}

#[tokio::test]
async fn selecting_current_filter_keeps_subscription() {
    let (feed, mut view) = recording_view().await;
    assert_eq!(view.set_filter(StatusTab::Active), LoadOutcome::Skipped);
    assert_eq!(feed.calls(), vec![Call::Subscribe(1)]);
}

#[tokio::test]
async fn changing_page_keeps_filter() {
    let (feed, mut view) = recording_view().await;
    view.set_filter(StatusTab::Paid);

    view.set_page(2);
    assert_eq!(view.tab(), StatusTab::Paid);
    assert_eq!(feed.last_query().tab, StatusTab::Paid);
    assert_eq!(feed.last_query().window.offset, 2);
    assert!(view.is_loading());
}

#[tokio::test]
async fn go_to_page_rejects_page_zero() {
    let (feed, mut view) = recording_view().await;
    assert!(view.go_to_page(0).is_err());
    assert_eq!(feed.calls(), vec![Call::Subscribe(1)]);
}

#[tokio::test]
async fn subscription_error_keeps_last_good_page() {
    let feed = Arc::new(RecordingFeed::default());
    let reporter = Arc::new(RecordingReporter::default());
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default())
        .with_reporter(reporter.clone());
    view.mount(identity("0xme")).await;

    feed.push(1, page(&["a", "b"], 0, 2));
    assert_eq!(view.next_update().await, Some(ApplyOutcome::Accepted));

    feed.push_error(1, "socket closed");
    assert_eq!(view.next_update().await, Some(ApplyOutcome::Failed));

    assert!(!view.is_loading());
    assert_eq!(item_ids(&view), vec!["a", "b"]);
    assert_eq!(view.total(), 2);
    assert_eq!(view.display(), ListDisplay::Rows);
    assert_eq!(
        *reporter.errors.lock().unwrap(),
        vec![FeedError::Remote("socket closed".to_string())]
    );
}

#[tokio::test]
async fn superseded_results_are_discarded() {
    let (feed, mut view) = recording_view().await;
    view.set_filter(StatusTab::Paid);

    // The first subscription's stream is gone, so its late push never lands.
    assert!(!feed.push(1, page(&["stale"], 0, 1)));
    // Even if it reached the view, it would not be applied.
    let late = FeedEnvelope::result(SubscriptionHandle::from_raw(1), page(&["stale"], 0, 1));
    assert_eq!(view.apply(late), ApplyOutcome::Discarded);
    assert!(view.is_loading());

    assert!(feed.push(2, page(&["fresh"], 0, 1)));
    assert_eq!(view.drain_pending(), 1);
    assert_eq!(item_ids(&view), vec!["fresh"]);
    assert_eq!(view.state(), &LoadState::Active(SubscriptionHandle::from_raw(2)));
}

#[tokio::test]
async fn identity_change_resubscribes_on_first_page_of_same_tab() {
    let (feed, mut view) = recording_view().await;
    view.set_filter(StatusTab::Paid);
    view.set_page(2);
    assert!(feed.push(3, page(&["previous-actor"], 2, 21)));
    view.drain_pending();

    let outcome = view.set_identity(Some(identity("0xother"))).await;
    assert_eq!(outcome, LoadOutcome::Subscribed);
    assert!(view.items().is_empty());

    let query = feed.last_query();
    assert_eq!(query.tab, StatusTab::Paid);
    assert_eq!(query.window.offset, 0);
    assert_eq!(query.owner, address("0xother"));
    assert_eq!(query.recipient, address("0xother"));
    assert!(view.is_loading());
}

#[tokio::test]
async fn equal_identity_value_is_not_a_change() {
    let (feed, mut view) = recording_view().await;
    assert_eq!(view.set_identity(Some(identity("0xME"))).await, LoadOutcome::Skipped);
    assert_eq!(feed.calls(), vec![Call::Subscribe(1)]);
}

#[tokio::test]
async fn sign_out_stops_subscription() {
    let (feed, mut view) = recording_view().await;
    assert!(feed.push(1, page(&["secret"], 0, 1)));
    view.drain_pending();
    view.set_identity(None).await;

    assert_eq!(feed.live(), 0);
    assert_eq!(view.state(), &LoadState::Idle);
    assert!(view.items().is_empty());
    assert_eq!(view.display(), ListDisplay::NotLoaded);
    assert_eq!(view.pagination(), None);
    assert_eq!(view.active_handle(), None);
    assert_eq!(view.reload(), LoadOutcome::Skipped);
}

#[tokio::test]
async fn failed_start_ends_loading_and_reload_retries() {
    let feed = Arc::new(RecordingFeed::default());
    let reporter = Arc::new(RecordingReporter::default());
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default())
        .with_reporter(reporter.clone());

    feed.refuse(true);
    assert_eq!(view.mount(identity("0xme")).await, LoadOutcome::StartFailed);
    assert!(!view.is_loading());
    assert_eq!(view.active_handle(), None);
    assert_eq!(view.display(), ListDisplay::Failed);
    assert_eq!(reporter.errors.lock().unwrap().len(), 1);

    feed.refuse(false);
    assert_eq!(view.reload(), LoadOutcome::Subscribed);
    assert!(view.is_loading());
}

#[tokio::test]
async fn teardown_freezes_state() {
    let (feed, mut view) = recording_view().await;
    feed.push(1, page(&["a"], 0, 1));
    view.drain_pending();

    view.teardown();
    assert_eq!(feed.live(), 0);
    assert!(!feed.push(1, page(&["late"], 0, 1)));

    let late = FeedEnvelope::result(SubscriptionHandle::from_raw(1), page(&["late"], 0, 1));
    assert_eq!(view.apply(late), ApplyOutcome::Discarded);
    assert_eq!(view.next_update().await, None);
    assert_eq!(view.set_filter(StatusTab::Paid), LoadOutcome::Skipped);
    assert_eq!(view.set_page(3), LoadOutcome::Skipped);
    assert_eq!(view.reload(), LoadOutcome::Skipped);

    assert_eq!(item_ids(&view), vec!["a"]);
    assert_eq!(view.state(), &LoadState::Disposed);
    assert_eq!(feed.calls().last(), Some(&Call::Unsubscribe(1)));
}

#[tokio::test]
async fn tab_switch_to_empty_tab_shows_empty_state() {
    let feed = Arc::new(InMemoryMilestoneFeed::new([
        milestone("A", MilestoneStatus::InProgress, "0xme", 2),
        milestone("B", MilestoneStatus::NeedsReview, "0xme", 1),
    ]));
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());

    view.mount(identity("0xme")).await;
    assert_eq!(view.next_update().await, Some(ApplyOutcome::Accepted));
    assert!(!view.is_loading());
    assert_eq!(item_ids(&view), vec!["A", "B"]);
    assert_eq!(view.total(), 2);

    assert_eq!(view.set_filter(StatusTab::Paid), LoadOutcome::Subscribed);
    assert!(view.is_loading());
    assert_eq!(view.window().offset, 0);
    assert_eq!(view.tab(), StatusTab::Paid);

    assert_eq!(view.next_update().await, Some(ApplyOutcome::Accepted));
    assert!(!view.is_loading());
    assert!(view.items().is_empty());
    assert_eq!(view.total(), 0);
    assert_eq!(view.display(), ListDisplay::Empty);
    assert_eq!(feed.live_subscriptions(), 1);
}

#[tokio::test]
async fn third_page_of_twenty_five() {
    let feed = Arc::new(InMemoryMilestoneFeed::new((0..25).map(|i| {
        milestone(&format!("m{i:02}"), MilestoneStatus::InProgress, "0xme", i)
    })));
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());
    view.mount(identity("0xme")).await;
    view.next_update().await;
    assert!(view.pagination().unwrap().show_control);

    assert_eq!(view.go_to_page(3).unwrap(), LoadOutcome::Subscribed);
    assert_eq!(view.window(), PageWindow { offset: 2, size: 10 });
    assert_eq!(view.next_update().await, Some(ApplyOutcome::Accepted));

    assert_eq!(view.items().len(), 5);
    assert_eq!(view.total(), 25);
    let pagination = view.pagination().unwrap();
    assert_eq!(pagination.active_page, 3);
    assert_eq!(pagination.page_count, 3);
    assert_eq!(pagination.label(), "Page 3 of 3");
}

#[tokio::test]
async fn far_page_offset_summarizes_without_overflow() {
    let feed = Arc::new(InMemoryMilestoneFeed::new([milestone(
        "a",
        MilestoneStatus::InProgress,
        "0xme",
        1,
    )]));
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());
    view.mount(identity("0xme")).await;
    view.next_update().await;

    assert_eq!(view.set_page(usize::MAX), LoadOutcome::Subscribed);
    assert_eq!(view.next_update().await, Some(ApplyOutcome::Accepted));
    assert!(view.items().is_empty());
    let pagination = view.pagination().unwrap();
    assert_eq!(pagination.active_page, usize::MAX);
    assert_eq!(pagination.page_count, 1);
}

#[tokio::test]
async fn live_updates_replace_the_page() {
    let feed = Arc::new(InMemoryMilestoneFeed::new([milestone(
        "a",
        MilestoneStatus::InProgress,
        "0xme",
        1,
    )]));
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, ViewConfig::default());
    view.mount(identity("0xme")).await;
    view.next_update().await;

    let mut paid = milestone("a", MilestoneStatus::Paid, "0xme", 1);
    paid.title = "Paid out".to_string();
    feed.upsert(paid);
    feed.upsert(milestone("b", MilestoneStatus::Pending, "0xme", 2));

    assert_eq!(view.drain_pending(), 2);
    assert_eq!(item_ids(&view), vec!["b"]);
    let rows = view.rows(Utc::now());
    assert!(rows[0].pending);
}

#[tokio::test]
async fn tabs_follow_current_filter() {
    let (_feed, mut view) = recording_view().await;
    view.set_filter(StatusTab::Rejected);
    let active = view
        .tabs()
        .into_iter()
        .filter(|tab| tab.active)
        .map(|tab| tab.tab)
        .collect::<Vec<_>>();
    assert_eq!(active, vec![StatusTab::Rejected]);
}

#[tokio::test]
async fn configured_page_size_is_requested() {
    let feed = Arc::new(RecordingFeed::default());
    let config = ViewConfig {
        page_size: 25,
        ..ViewConfig::default()
    };
    let mut view = MyMilestonesView::new(Arc::clone(&feed), StaticAuthGate, config);
    view.mount(identity("0xme")).await;
    assert_eq!(feed.last_query().window.size, 25);
    assert_eq!(view.identity().map(|me| &me.address), Some(&Address::new("0xme").unwrap()));
}
