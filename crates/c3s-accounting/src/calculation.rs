use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use c3s_data::{DuesStart, Member, Quarter};

use crate::errors::DuesError;

/// Annual dues, charged pro rata by the quarter
/// in which the membership started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuesSchedule {
    pub annual_amount: Decimal,
}

impl Default for DuesSchedule {
    fn default() -> Self {
        Self {
            annual_amount: Decimal::from(50),
        }
    }
}

impl DuesSchedule {
    pub fn new(annual_amount: Decimal) -> Self {
        Self { annual_amount }
    }

    /// Amount for a membership starting in the given quarter:
    /// the remaining quarters of the year are charged.
    pub fn amount_for(&self, quarter: Quarter) -> Decimal {
        let remaining = 5 - quarter.number();
        self.annual_amount * Decimal::from(remaining) / Decimal::from(4)
    }

    /// Calculate the dues start and amount for a membership date.
    /// Memberships starting before the dues year pay the full amount,
    /// memberships starting after it are not charged at all.
    pub fn calculate(
        &self,
        membership_date: NaiveDate,
        year: i32,
    ) -> Result<(DuesStart, Decimal), DuesError> {
        if membership_date.year() > year {
            return Err(DuesError::NotApplicable(membership_date, year));
        }
        let quarter = if membership_date.year() < year {
            Quarter::Q1
        } else {
            Quarter::of_month(membership_date.month())
        };
        let start = DuesStart { quarter, year };
        Ok((start, self.amount_for(quarter)))
    }
}

pub trait CalculateDues {
    /// Calculate the dues of a member for a year
    fn calculate_dues(
        &self,
        schedule: &DuesSchedule,
        year: i32,
    ) -> Result<(DuesStart, Decimal), DuesError>;
}

impl CalculateDues for Member {
    fn calculate_dues(
        &self,
        schedule: &DuesSchedule,
        year: i32,
    ) -> Result<(DuesStart, Decimal), DuesError> {
        let membership_date = self
            .membership_date
            .ok_or(DuesError::NoMembershipDate(self.id))?;
        schedule.calculate(membership_date, year)
    }
}
