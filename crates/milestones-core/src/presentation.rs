//! Display helpers for the milestone list: rows, tabs and pagination.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::config::ViewConfig;
use crate::models::{Milestone, MilestoneStatus, ResultPage, StatusTab};
use crate::util::truncate_text;

const ANONYMOUS_REVIEWER: &str = "Anonymous user";

/// One status tab as shown above the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabView {
    pub tab: StatusTab,
    pub label: &'static str,
    pub active: bool,
}

/// Tabs in display order with the current filter highlighted.
#[must_use]
pub fn tab_views(current: StatusTab) -> Vec<TabView> {
    StatusTab::ALL
        .into_iter()
        .map(|tab| TabView {
            tab,
            label: tab.label(),
            active: tab == current,
        })
        .collect()
}

/// State of the pagination control for one result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationSummary {
    /// 1-based page currently shown.
    pub active_page: usize,
    pub page_count: usize,
    pub total: usize,
    /// The control is hidden when everything fits on one page.
    pub show_control: bool,
    pub first_visible: usize,
    pub last_visible: usize,
}

impl PaginationSummary {
    #[must_use]
    pub fn new(page: &ResultPage, visible_pages: usize) -> Self {
        let active_page = page.offset.saturating_add(1);
        let page_count = page.page_count();
        let range = visible_pages.max(1);

        let anchor = active_page.min(page_count);
        let mut first = anchor.saturating_sub(range / 2).max(1);
        let last = first.saturating_add(range - 1).min(page_count);
        if last.saturating_sub(first).saturating_add(1) < range {
            first = last.saturating_add(1).saturating_sub(range).max(1);
        }

        Self {
            active_page,
            page_count,
            total: page.total,
            show_control: page.total > page.size,
            first_visible: first,
            last_visible: last,
        }
    }

    #[must_use]
    pub const fn visible_pages(&self) -> RangeInclusive<usize> {
        self.first_visible..=self.last_visible
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.active_page, self.page_count)
    }
}

/// Display-ready projection of one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneRow {
    pub key: String,
    pub created: String,
    pub title: String,
    pub campaign_title: String,
    pub status: String,
    /// Transaction still in flight: show a spinner next to the status.
    pub in_flight: bool,
    pub review_due: bool,
    pub requested: String,
    pub donation_count: u64,
    pub donated: String,
    pub reviewer: Option<String>,
    /// Row is highlighted as pending.
    pub pending: bool,
}

impl MilestoneRow {
    #[must_use]
    pub fn from_milestone(milestone: &Milestone, now: DateTime<Utc>, config: &ViewConfig) -> Self {
        let symbol = &milestone.token.symbol;
        let counter = milestone.primary_counter();
        let balance = counter
            .map(|counter| counter.current_balance.trim())
            .filter(|balance| !balance.is_empty())
            .unwrap_or("0");

        Self {
            key: milestone.id.to_string(),
            created: format_created(milestone.created_at),
            title: truncate_text(&milestone.title, config.title_max_chars),
            campaign_title: truncate_text(
                &milestone.campaign.title,
                config.campaign_title_max_chars,
            ),
            status: milestone.status.readable().to_string(),
            in_flight: milestone.status == MilestoneStatus::Pending
                || milestone.mined == Some(false),
            review_due: review_due(milestone, now, config.review_due_days),
            requested: format!("{} {symbol}", milestone.max_amount),
            donation_count: counter.map_or(0, |counter| counter.donation_count),
            donated: format!("{balance} {symbol}"),
            reviewer: milestone
                .reviewer
                .as_ref()
                .filter(|reviewer| reviewer.address.is_some())
                .map(|reviewer| {
                    reviewer
                        .name
                        .clone()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| ANONYMOUS_REVIEWER.to_string())
                }),
            pending: milestone.status == MilestoneStatus::Pending,
        }
    }
}

/// Whether a milestone awaiting review has sat untouched for more than
/// `days` days.
#[must_use]
pub fn review_due(milestone: &Milestone, now: DateTime<Utc>, days: u32) -> bool {
    milestone.status == MilestoneStatus::NeedsReview
        && now - Duration::days(i64::from(days)) > milestone.updated_at
}

/// Format a creation date like `5th Mar 2024`.
#[must_use]
pub fn format_created(date: DateTime<Utc>) -> String {
    let day = date.day();
    format!("{day}{} {}", ordinal_suffix(day), date.format("%b %Y"))
}

const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
