//! Milestone model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Address, MilestoneStatus};

/// Backend-assigned unique key for a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneId(String);

impl MilestoneId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Campaign a milestone belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
}

/// Per-token donation aggregate. Amounts are decimal strings passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCounter {
    #[serde(default)]
    pub donation_count: u64,
    #[serde(default)]
    pub current_balance: String,
}

/// A milestone record as pushed by the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(rename = "_id")]
    pub id: MilestoneId,
    pub title: String,
    pub status: MilestoneStatus,
    pub campaign: Campaign,
    pub owner_address: Address,
    pub recipient_address: Address,
    #[serde(default)]
    pub reviewer: Option<Reviewer>,
    pub max_amount: String,
    pub token: Token,
    #[serde(default)]
    pub donation_counters: Vec<DonationCounter>,
    /// Present only while the backing transaction is tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mined: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Donation aggregate shown in the list: the first counter, if any.
    #[must_use]
    pub fn primary_counter(&self) -> Option<&DonationCounter> {
        self.donation_counters.first()
    }
}
