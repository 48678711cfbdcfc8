use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Dues, DuesFilter, Query, Shares, SharesFilter};

/// Normal members have voting rights, investing
/// members only hold shares.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    #[default]
    Normal,
    Investing,
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipType::Normal => write!(f, "normal"),
            MembershipType::Investing => write!(f, "investing"),
        }
    }
}

impl FromStr for MembershipType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(MembershipType::Normal),
            "investing" => Ok(MembershipType::Investing),
            _ => Err(anyhow!("unknown membership type: {}", s)),
        }
    }
}

/// The reason a membership ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipLossType {
    Resignation,
    Expulsion,
    Death,
    Bankruptcy,
    Transfer,
}

impl fmt::Display for MembershipLossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MembershipLossType::Resignation => "resignation",
            MembershipLossType::Expulsion => "expulsion",
            MembershipLossType::Death => "death",
            MembershipLossType::Bankruptcy => "bankruptcy",
            MembershipLossType::Transfer => "transfer",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MembershipLossType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "resignation" => Ok(MembershipLossType::Resignation),
            "expulsion" => Ok(MembershipLossType::Expulsion),
            "death" => Ok(MembershipLossType::Death),
            "bankruptcy" => Ok(MembershipLossType::Bankruptcy),
            "transfer" => Ok(MembershipLossType::Transfer),
            _ => Err(anyhow!("unknown membership loss type: {}", s)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<u32>,
    /// Matches first or last name (case insensitive substring)
    pub name: Option<String>,
    pub email: Option<String>,
    pub membership_number: Option<u32>,
    pub membership_accepted: Option<bool>,
}

/// An applicant or member of the cooperative
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub address1: String,
    pub address2: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
    pub locale: String,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: String,

    // Application
    pub date_of_submission: NaiveDate,
    pub membership_type: MembershipType,
    pub is_legalentity: bool,
    pub num_shares: u32,
    pub signature_received: bool,
    pub signature_received_date: Option<NaiveDate>,
    pub payment_received: bool,
    pub payment_received_date: Option<NaiveDate>,

    // Membership
    pub membership_accepted: bool,
    pub membership_date: Option<NaiveDate>,
    pub membership_number: Option<u32>,
    pub membership_loss_date: Option<NaiveDate>,
    pub membership_loss_type: Option<MembershipLossType>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Check if the person is a member at the given date:
    /// The membership was accepted, started on or before the date
    /// and was not lost before the date.
    pub fn is_member(&self, date: NaiveDate) -> bool {
        if !self.membership_accepted {
            return false;
        }
        match self.membership_date {
            Some(start) if start <= date => {}
            _ => return false,
        }
        if let Some(loss) = self.membership_loss_date {
            if loss < date {
                return false;
            }
        }
        true
    }

    /// Check if the person was a member on any day
    /// between `start` and `end` (inclusive).
    pub fn is_member_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        if !self.membership_accepted {
            return false;
        }
        let Some(membership_date) = self.membership_date else {
            return false;
        };
        if membership_date > end {
            return false;
        }
        match self.membership_loss_date {
            Some(loss) => loss >= start,
            None => true,
        }
    }

    /// Get the share packages of a member
    pub async fn get_shares<DB>(&self, db: &DB) -> Result<Vec<Shares>>
    where
        DB: Query<Shares, Filter = SharesFilter>,
    {
        db.query(&SharesFilter {
            member_id: Some(self.id),
        })
        .await
    }

    /// Get the dues records of all years
    pub async fn get_dues<DB>(&self, db: &DB) -> Result<Vec<Dues>>
    where
        DB: Query<Dues, Filter = DuesFilter>,
    {
        db.query(&DuesFilter {
            member_id: Some(self.id),
            ..Default::default()
        })
        .await
    }
}
