//! Builders shared by unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{
    Address, Campaign, DonationCounter, Identity, Milestone, MilestoneId, MilestoneStatus, Token,
};

pub fn address(raw: &str) -> Address {
    Address::new(raw).unwrap()
}

pub fn identity(raw: &str) -> Identity {
    Identity::authenticated(address(raw))
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A milestone owned by `owner`, created `day` days after [`base_time`].
pub fn milestone(id: &str, status: MilestoneStatus, owner: &str, day: i64) -> Milestone {
    let created_at = base_time() + Duration::days(day);
    Milestone {
        id: MilestoneId::new(id),
        title: format!("Milestone {id}"),
        status,
        campaign: Campaign {
            id: format!("campaign-{id}"),
            title: "Clean water".to_string(),
        },
        owner_address: address(owner),
        recipient_address: address(owner),
        reviewer: None,
        max_amount: "10".to_string(),
        token: Token {
            symbol: "ETH".to_string(),
        },
        donation_counters: vec![DonationCounter {
            donation_count: 2,
            current_balance: "4.5".to_string(),
        }],
        mined: None,
        created_at,
        updated_at: created_at,
    }
}
