//! The "my milestones" view core.
//!
//! [`MyMilestonesView`] ties together the [`SubscriptionController`], the
//! [`PaginationState`] and the [`ResultReconciler`]. Every identity, tab or
//! page change tears down the live subscription and opens a new one for the
//! current state; pushes flow back through [`MyMilestonesView::apply`], which
//! only accepts results from the subscription that is currently live.
//!
//! The view is driven from a single task: callers feed it user actions and
//! await [`MyMilestonesView::next_update`] for pushes.

mod controller;
mod pagination;
mod reconciler;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AuthGate;
use crate::config::ViewConfig;
use crate::feed::{FeedEnvelope, FeedError, FeedEvent, MilestoneFeed, SubscriptionHandle};
use crate::models::{Identity, Milestone, PageWindow, StatusTab};
use crate::presentation::{tab_views, MilestoneRow, PaginationSummary, TabView};
use crate::Result;

pub use controller::SubscriptionController;
pub use pagination::PaginationState;
pub use reconciler::{ApplyOutcome, ListDisplay, LoadState, ResultReconciler};

/// Receives feed failures for user-facing notification.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &FeedError);
}

/// Reports feed failures to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: &FeedError) {
        tracing::warn!("Milestone feed error: {error}");
    }
}

/// Result of an action that may (re)open the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new subscription was opened; the list is loading.
    Subscribed,
    /// The current identity did not pass the auth gate; nothing was
    /// requested.
    AuthRequired,
    /// The feed refused the subscription; loading ended.
    StartFailed,
    /// Nothing to do: no identity, unchanged state, or torn down.
    Skipped,
}

/// Paginated, filterable live list of the current actor's milestones.
pub struct MyMilestonesView<F: MilestoneFeed, A: AuthGate> {
    config: ViewConfig,
    auth: A,
    reporter: Arc<dyn ErrorReporter>,
    identity: Option<Identity>,
    /// The current identity passed the auth gate.
    authorized: bool,
    controller: SubscriptionController<F>,
    pagination: PaginationState,
    reconciler: ResultReconciler,
}

impl<F: MilestoneFeed, A: AuthGate> MyMilestonesView<F, A> {
    pub fn new(feed: Arc<F>, auth: A, config: ViewConfig) -> Self {
        let pagination = PaginationState::new(config.initial_window());
        Self {
            config,
            auth,
            reporter: Arc::new(TracingErrorReporter),
            identity: None,
            authorized: false,
            controller: SubscriptionController::new(feed),
            pagination,
            reconciler: ResultReconciler::default(),
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// First load for `identity`, gated on authentication.
    ///
    /// An unauthenticated actor gets no subscription and no error; prompting
    /// them to sign in is someone else's job. Until an identity passes the
    /// gate, every action that would subscribe returns
    /// [`LoadOutcome::AuthRequired`].
    pub async fn mount(&mut self, identity: Identity) -> LoadOutcome {
        if self.controller.is_disposed() {
            return LoadOutcome::Skipped;
        }
        self.identity = Some(identity);
        if !self.authorize().await {
            return LoadOutcome::AuthRequired;
        }

        if let Some(identity) = &self.identity {
            tracing::info!("Loading milestones for {}", identity.address);
        }
        self.resubscribe()
    }

    /// React to a new identity value. `None` means signed out.
    ///
    /// A different identity drops the rows on screen, passes the auth gate
    /// again and goes back to the first page of the current tab.
    pub async fn set_identity(&mut self, identity: Option<Identity>) -> LoadOutcome {
        if self.controller.is_disposed() || self.identity == identity {
            return LoadOutcome::Skipped;
        }
        self.identity = identity;
        self.pagination.reset_offset();
        self.clear();

        if self.identity.is_none() {
            self.authorized = false;
            return LoadOutcome::Skipped;
        }
        if !self.authorize().await {
            return LoadOutcome::AuthRequired;
        }
        self.resubscribe()
    }

    /// Select a status tab. Selecting the current tab does nothing.
    pub fn set_filter(&mut self, tab: StatusTab) -> LoadOutcome {
        if self.controller.is_disposed() || !self.pagination.set_filter(tab) {
            return LoadOutcome::Skipped;
        }
        self.resubscribe()
    }

    /// Show page index `offset` of the current tab.
    pub fn set_page(&mut self, offset: usize) -> LoadOutcome {
        if self.controller.is_disposed() {
            return LoadOutcome::Skipped;
        }
        self.pagination.set_page(offset);
        self.resubscribe()
    }

    /// Show 1-based page `page_number`, as picked in the pagination control.
    pub fn go_to_page(&mut self, page_number: usize) -> Result<LoadOutcome> {
        if self.controller.is_disposed() {
            return Ok(LoadOutcome::Skipped);
        }
        self.pagination.go_to_page(page_number)?;
        Ok(self.resubscribe())
    }

    /// Re-open the subscription for the current state, e.g. after an error.
    pub fn reload(&mut self) -> LoadOutcome {
        self.resubscribe()
    }

    /// Wait for the next push and apply it.
    ///
    /// Returns `None` when there is no live subscription to wait on.
    pub async fn next_update(&mut self) -> Option<ApplyOutcome> {
        let envelope = self.controller.next_event().await?;
        Some(self.apply(envelope))
    }

    /// Apply every push already buffered, without waiting. Returns how many
    /// were processed.
    pub fn drain_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Some(envelope) = self.controller.try_next_event() {
            self.apply(envelope);
            processed += 1;
        }
        processed
    }

    /// Apply one push. Pushes from anything but the live subscription are
    /// discarded.
    pub fn apply(&mut self, envelope: FeedEnvelope) -> ApplyOutcome {
        let error = match &envelope.event {
            FeedEvent::Error(error) => Some(error.clone()),
            FeedEvent::Result(_) => None,
        };

        let outcome = self.reconciler.apply(envelope);
        match outcome {
            ApplyOutcome::Accepted => {
                if let Some(page) = self.reconciler.snapshot() {
                    self.pagination.sync_window(page.window());
                }
            }
            ApplyOutcome::Failed => {
                if let Some(error) = error {
                    self.reporter.report(&error);
                }
            }
            ApplyOutcome::Discarded => {}
        }
        outcome
    }

    /// Permanently dispose the view. No push mutates it afterwards.
    pub fn teardown(&mut self) {
        if self.controller.is_disposed() {
            return;
        }
        self.controller.teardown();
        self.reconciler.dispose();
        tracing::debug!("Milestones view torn down");
    }

    /// Run the auth gate for the current identity. A rejected actor keeps
    /// nothing on screen.
    async fn authorize(&mut self) -> bool {
        let Some(identity) = self.identity.as_ref() else {
            self.authorized = false;
            return false;
        };
        let result = self.auth.ensure_authenticated(identity).await;
        if let Err(error) = result {
            tracing::debug!("Not loading milestones for {}: {error}", identity.address);
            self.authorized = false;
            self.clear();
            return false;
        }
        self.authorized = true;
        true
    }

    /// Stop the subscription and forget the page on screen.
    fn clear(&mut self) {
        self.controller.stop();
        self.reconciler.reset();
    }

    fn resubscribe(&mut self) -> LoadOutcome {
        if self.controller.is_disposed() {
            return LoadOutcome::Skipped;
        }
        let Some(identity) = self.identity.as_ref() else {
            tracing::debug!("No identity; not subscribing");
            return LoadOutcome::Skipped;
        };
        if !self.authorized {
            tracing::debug!("{} is not authenticated; not subscribing", identity.address);
            return LoadOutcome::AuthRequired;
        }

        let query = self.pagination.request(identity);
        match self.controller.start(&query) {
            Ok(handle) => {
                self.reconciler.begin(handle);
                LoadOutcome::Subscribed
            }
            Err(error) => {
                self.reconciler.fail_start(&error);
                self.reporter.report(&error);
                LoadOutcome::StartFailed
            }
        }
    }

    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub const fn tab(&self) -> StatusTab {
        self.pagination.tab()
    }

    pub const fn window(&self) -> PageWindow {
        self.pagination.window()
    }

    pub const fn state(&self) -> &LoadState {
        self.reconciler.state()
    }

    pub fn active_handle(&self) -> Option<SubscriptionHandle> {
        self.controller.active_handle()
    }

    pub const fn is_loading(&self) -> bool {
        self.reconciler.is_loading()
    }

    pub fn items(&self) -> &[Milestone] {
        self.reconciler.items()
    }

    pub fn total(&self) -> usize {
        self.reconciler.total()
    }

    pub fn display(&self) -> ListDisplay {
        self.reconciler.display()
    }

    pub fn tabs(&self) -> Vec<TabView> {
        tab_views(self.tab())
    }

    /// Pagination control state for the page on screen, once one has loaded.
    pub fn pagination(&self) -> Option<PaginationSummary> {
        self.reconciler
            .snapshot()
            .map(|page| PaginationSummary::new(page, self.config.visible_pages))
    }

    pub fn rows(&self, now: DateTime<Utc>) -> Vec<MilestoneRow> {
        self.items()
            .iter()
            .map(|milestone| MilestoneRow::from_milestone(milestone, now, &self.config))
            .collect()
    }
}
