use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Upper limit of shares a single member may hold
pub const MAX_SHARES_PER_MEMBER: u32 = 60;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SharesFilter {
    pub member_id: Option<u32>,
}

/// A package of shares acquired by a member at once
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Shares {
    pub id: u32,
    pub member_id: u32,
    pub number: u32,
    pub date_of_acquisition: NaiveDate,
    pub reference_code: String,
}

/// Total number of shares over all packages
pub fn count_shares(packages: &[Shares]) -> u32 {
    packages.iter().map(|s| s.number).sum()
}
