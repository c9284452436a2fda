//! View configuration.
//!
//! `ViewConfig` carries the tunables of the milestone list: page size, how many
//! page numbers the pagination control shows, when a review counts as overdue,
//! and title truncation. Values come from an optional JSON file and can be
//! overridden from the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{PageWindow, DEFAULT_PAGE_SIZE};
use crate::util::normalize_text_option;
use crate::{Error, Result};

pub const PAGE_SIZE_ENV: &str = "MILESTONES_PAGE_SIZE";
pub const VISIBLE_PAGES_ENV: &str = "MILESTONES_VISIBLE_PAGES";
pub const REVIEW_DUE_DAYS_ENV: &str = "MILESTONES_REVIEW_DUE_DAYS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Items per page requested from the feed.
    pub page_size: usize,
    /// Page numbers shown at once by the pagination control.
    pub visible_pages: usize,
    /// Days without an update after which a milestone under review is overdue.
    pub review_due_days: u32,
    pub title_max_chars: usize,
    pub campaign_title_max_chars: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            visible_pages: 10,
            review_due_days: 3,
            title_max_chars: 35,
            campaign_title_max_chars: 40,
        }
    }
}

impl ViewConfig {
    /// Parse a JSON config payload. Missing fields keep their defaults.
    pub fn parse(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let payload = std::fs::read_to_string(path)?;
        Self::parse(&payload)
    }

    /// Apply `MILESTONES_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = override_value(&lookup, PAGE_SIZE_ENV)? {
            self.page_size = value;
        }
        if let Some(value) = override_value(&lookup, VISIBLE_PAGES_ENV)? {
            self.visible_pages = value;
        }
        if let Some(value) = override_value(&lookup, REVIEW_DUE_DAYS_ENV)? {
            self.review_due_days = value;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".to_string()));
        }
        if self.visible_pages == 0 {
            return Err(Error::Config("visible_pages must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Window requested on mount: first page at the configured size.
    #[must_use]
    pub fn initial_window(&self) -> PageWindow {
        PageWindow {
            offset: 0,
            size: self.page_size.max(1),
        }
    }
}

fn override_value<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = normalize_text_option(lookup(key)) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got '{raw}'")))
}
