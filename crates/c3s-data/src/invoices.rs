use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{columns, Member, Retrieve};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DuesInvoiceFilter {
    pub year: Option<i32>,
    pub invoice_no: Option<u32>,
    pub member_id: Option<u32>,
    pub is_reversal: Option<bool>,
}

/// An accounting document for the dues of a member.
///
/// Invoices of a member in a year form a revision chain
/// through the preceding and succeeding invoice numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuesInvoice {
    pub id: u32,
    pub year: i32,
    pub invoice_no: u32,
    pub invoice_no_string: String,
    pub invoice_date: NaiveDate,
    pub invoice_amount: Decimal,
    pub is_reversal: bool,
    pub is_cancelled: bool,
    pub is_altered: bool,
    pub preceding_invoice_no: Option<u32>,
    pub succeeding_invoice_no: Option<u32>,
    pub member_id: u32,
    pub membership_no: Option<u32>,
    pub email: String,
    pub token: String,
}

impl DuesInvoice {
    /// Format the printed invoice number, e.g. `C3S-dues2018-0042`.
    /// Reversal invoices carry an `-S` (Storno) suffix.
    pub fn format_invoice_no(year: i32, invoice_no: u32, is_reversal: bool) -> String {
        let suffix = if is_reversal { "-S" } else { "" };
        format!("C3S-dues{}-{:04}{}", year, invoice_no, suffix)
    }

    /// Get the member the invoice was issued to
    pub async fn get_member<DB>(&self, db: &DB) -> Result<Member>
    where
        DB: Retrieve<Member, Key = u32>,
    {
        db.retrieve(self.member_id).await
    }
}

impl<'r> FromRow<'r, SqliteRow> for DuesInvoice {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(DuesInvoice {
            id: row.try_get("id")?,
            year: row.try_get("year")?,
            invoice_no: row.try_get("invoice_no")?,
            invoice_no_string: row.try_get("invoice_no_string")?,
            invoice_date: row.try_get("invoice_date")?,
            invoice_amount: columns::decimal(row, "invoice_amount")?,
            is_reversal: row.try_get("is_reversal")?,
            is_cancelled: row.try_get("is_cancelled")?,
            is_altered: row.try_get("is_altered")?,
            preceding_invoice_no: row.try_get("preceding_invoice_no")?,
            succeeding_invoice_no: row.try_get("succeeding_invoice_no")?,
            member_id: row.try_get("member_id")?,
            membership_no: row.try_get("membership_no")?,
            email: row.try_get("email")?,
            token: row.try_get("token")?,
        })
    }
}
