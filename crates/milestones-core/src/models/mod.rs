//! Data models for My Milestones

mod identity;
mod milestone;
mod page;
mod status;

pub use identity::{Address, Identity};
pub use milestone::{Campaign, DonationCounter, Milestone, MilestoneId, Reviewer, Token};
pub use page::{PageWindow, ResultPage, DEFAULT_PAGE_SIZE};
pub use status::{MilestoneStatus, StatusTab};
