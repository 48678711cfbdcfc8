use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{columns, DuesInvoice, DuesInvoiceFilter, Query};

/// Quarter of the year in which a membership started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    #[default]
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Quarter for a month (1-12)
    pub fn of_month(month: u32) -> Self {
        match month {
            1..=3 => Quarter::Q1,
            4..=6 => Quarter::Q2,
            7..=9 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }
}

/// The dues start code, e.g. `q3_2018`: the quarter of the
/// dues year from which on dues are charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesStart {
    pub quarter: Quarter,
    pub year: i32,
}

impl fmt::Display for DuesStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}_{}", self.quarter.number(), self.year)
    }
}

impl FromStr for DuesStart {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (quarter, year) = s
            .strip_prefix('q')
            .and_then(|rest| rest.split_once('_'))
            .ok_or_else(|| anyhow!("invalid dues start code: {}", s))?;
        let quarter = match quarter {
            "1" => Quarter::Q1,
            "2" => Quarter::Q2,
            "3" => Quarter::Q3,
            "4" => Quarter::Q4,
            _ => return Err(anyhow!("invalid quarter in dues start code: {}", s)),
        };
        let year = year.parse()?;
        Ok(DuesStart { quarter, year })
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DuesFilter {
    pub member_id: Option<u32>,
    pub year: Option<i32>,
    pub paid: Option<bool>,
}

/// The dues of one member for one fiscal year.
///
/// `reduced` and `balanced` mirror the amounts and must only be
/// changed through the setters below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dues {
    pub member_id: u32,
    pub year: i32,
    pub start: DuesStart,
    pub amount: Decimal,
    pub amount_reduced: Option<Decimal>,
    pub reduced: bool,
    pub balance: Decimal,
    pub balanced: bool,
    pub paid: bool,
    pub amount_paid: Decimal,
    pub paid_date: Option<NaiveDate>,
    pub invoice_no: Option<u32>,
    pub invoice_date: Option<NaiveDate>,
    pub token: Option<String>,
}

impl Dues {
    /// Create dues for a year. The full amount is owed.
    pub fn new(member_id: u32, start: DuesStart, amount: Decimal) -> Self {
        let mut dues = Dues {
            member_id,
            year: start.year,
            start,
            amount,
            ..Default::default()
        };
        dues.set_balance(amount);
        dues
    }

    /// The amount currently charged: the reduced amount
    /// if there is one, the calculated amount otherwise.
    pub fn effective_amount(&self) -> Decimal {
        match self.amount_reduced {
            Some(reduced) if self.reduced => reduced,
            _ => self.amount,
        }
    }

    pub fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
        self.balanced = balance.is_zero();
    }

    /// Set the reduced amount. The balance moves by the difference
    /// between the previously charged and the new amount.
    pub fn set_amount_reduced(&mut self, amount_reduced: Decimal) {
        let previous = self.effective_amount();
        self.amount_reduced = Some(amount_reduced);
        self.reduced = amount_reduced != self.amount;
        self.set_balance(self.balance + amount_reduced - previous);
    }

    /// Book a payment. Over- and underpayments are accepted
    /// and show up in the balance.
    pub fn record_payment(&mut self, amount: Decimal, date: NaiveDate) {
        self.amount_paid += amount;
        self.paid = true;
        self.paid_date = Some(date);
        self.set_balance(self.balance - amount);
    }

    /// Get all invoices of the member for this year
    pub async fn get_invoices<DB>(&self, db: &DB) -> Result<Vec<DuesInvoice>>
    where
        DB: Query<DuesInvoice, Filter = DuesInvoiceFilter>,
    {
        db.query(&DuesInvoiceFilter {
            year: Some(self.year),
            member_id: Some(self.member_id),
            ..Default::default()
        })
        .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for Dues {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let start: String = row.try_get("start")?;
        let start = start
            .parse::<DuesStart>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(Dues {
            member_id: row.try_get("member_id")?,
            year: row.try_get("year")?,
            start,
            amount: columns::decimal(row, "amount")?,
            amount_reduced: columns::optional_decimal(row, "amount_reduced")?,
            reduced: row.try_get("reduced")?,
            balance: columns::decimal(row, "balance")?,
            balanced: row.try_get("balanced")?,
            paid: row.try_get("paid")?,
            amount_paid: columns::decimal(row, "amount_paid")?,
            paid_date: row.try_get("paid_date")?,
            invoice_no: row.try_get("invoice_no")?,
            invoice_date: row.try_get("invoice_date")?,
            token: row.try_get("token")?,
        })
    }
}
