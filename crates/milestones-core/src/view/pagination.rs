//! Filter and page window state.

use crate::feed::MilestoneQuery;
use crate::models::{Identity, PageWindow, StatusTab};
use crate::{Error, Result};

/// Current status tab and page window. Both go verbatim into the next
/// subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    tab: StatusTab,
    window: PageWindow,
}

impl PaginationState {
    #[must_use]
    pub fn new(window: PageWindow) -> Self {
        Self {
            tab: StatusTab::default(),
            window,
        }
    }

    pub const fn tab(&self) -> StatusTab {
        self.tab
    }

    pub const fn window(&self) -> PageWindow {
        self.window
    }

    /// Switch tabs. Returns `false` and changes nothing when `tab` is already
    /// selected; otherwise the offset goes back to the first page.
    pub fn set_filter(&mut self, tab: StatusTab) -> bool {
        if tab == self.tab {
            return false;
        }
        self.tab = tab;
        self.window.offset = 0;
        true
    }

    /// Jump to a page index. Not bounds-checked against the total.
    pub fn set_page(&mut self, offset: usize) {
        self.window.offset = offset;
    }

    /// Jump to a 1-based page number, as reported by the pagination control.
    pub fn go_to_page(&mut self, page_number: usize) -> Result<()> {
        let offset = page_number
            .checked_sub(1)
            .ok_or_else(|| Error::InvalidInput("Page numbers start at 1".to_string()))?;
        self.set_page(offset);
        Ok(())
    }

    pub fn reset_offset(&mut self) {
        self.window.offset = 0;
    }

    /// Adopt the window echoed back by an accepted result.
    pub fn sync_window(&mut self, window: PageWindow) {
        if window.size > 0 {
            self.window = window;
        }
    }

    /// Subscription request for `identity` as both owner and recipient.
    #[must_use]
    pub fn request(&self, identity: &Identity) -> MilestoneQuery {
        MilestoneQuery {
            tab: self.tab,
            owner: identity.address.clone(),
            recipient: identity.address.clone(),
            window: self.window,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(PageWindow::default())
    }
}
