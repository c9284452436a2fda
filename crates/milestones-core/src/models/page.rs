//! Page windows and result pages

use serde::{Deserialize, Serialize};

use crate::models::Milestone;
use crate::{Error, Result};

/// Items per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which slice of a filtered result set is requested.
///
/// `offset` is a page index, `size` is items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: usize,
    pub size: usize,
}

impl PageWindow {
    pub fn new(offset: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidInput(
                "Page size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { offset, size })
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn skip(&self) -> usize {
        self.offset.saturating_mul(self.size)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One immutable server snapshot for a filter/page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<Milestone>,
    pub size: usize,
    pub offset: usize,
    pub total: usize,
}

impl ResultPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn window(&self) -> PageWindow {
        PageWindow {
            offset: self.offset,
            size: self.size,
        }
    }

    /// Total number of pages for `total` items, at least one.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        if self.size == 0 || self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.size)
        }
    }
}
