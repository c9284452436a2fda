//! Milestone lifecycle statuses and the status tabs that partition them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Backend lifecycle status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilestoneStatus {
    Proposed,
    Rejected,
    Pending,
    InProgress,
    NeedsReview,
    Completed,
    Canceled,
    Paying,
    Paid,
    Failed,
    Archived,
}

impl MilestoneStatus {
    /// Human readable label.
    #[must_use]
    pub const fn readable(self) -> &'static str {
        match self {
            Self::Proposed => "Proposed",
            Self::Rejected => "Rejected",
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::NeedsReview => "Needs Review",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
            Self::Paying => "Paying",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Archived => "Archived",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.readable())
    }
}

/// Status tab (the list filter). Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTab {
    #[default]
    Active,
    Paid,
    Canceled,
    Rejected,
}

impl StatusTab {
    /// Every tab, in display order.
    pub const ALL: [Self; 4] = [Self::Active, Self::Paid, Self::Canceled, Self::Rejected];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paid => "Paid",
            Self::Canceled => "Canceled",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether a milestone with `status` belongs under this tab.
    #[must_use]
    pub const fn matches(self, status: MilestoneStatus) -> bool {
        match self {
            Self::Paid => matches!(status, MilestoneStatus::Paid | MilestoneStatus::Paying),
            Self::Canceled => matches!(status, MilestoneStatus::Canceled),
            Self::Rejected => matches!(status, MilestoneStatus::Rejected),
            Self::Active => !matches!(
                status,
                MilestoneStatus::Paid
                    | MilestoneStatus::Paying
                    | MilestoneStatus::Canceled
                    | MilestoneStatus::Rejected
                    | MilestoneStatus::Archived
            ),
        }
    }
}

impl fmt::Display for StatusTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusTab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown status tab: {normalized}")))
    }
}
