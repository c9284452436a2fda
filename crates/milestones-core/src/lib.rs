//! milestones-core - Core library for My Milestones
//!
//! This crate contains the milestone models, the live feed contract with an
//! in-memory implementation, and the paginated view state machine shared by
//! every client surface.

pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod presentation;
pub mod util;
pub mod view;

#[cfg(test)]
mod test_support;

pub use config::ViewConfig;
pub use error::{Error, Result};
pub use models::{Address, Identity, Milestone, MilestoneId, MilestoneStatus, StatusTab};
pub use view::MyMilestonesView;
