use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use c3s_data::{Dues, DuesFilter, DuesInvoice, DuesInvoiceFilter, Query, Retrieve};

use crate::datetime::AlignStart;

/// Invoice and payment totals of one month
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyStats {
    pub month: NaiveDate,
    pub amount_invoiced_normal: Decimal,
    pub amount_invoiced_reversal: Decimal,
    pub amount_paid: Decimal,
}

/// Lookups and aggregations over the dues invoices of all years
pub struct DuesInvoiceRepository<'a, DB> {
    db: &'a DB,
}

impl<'a, DB> DuesInvoiceRepository<'a, DB>
where
    DB: Query<DuesInvoice, Filter = DuesInvoiceFilter>
        + Query<Dues, Filter = DuesFilter>
        + Retrieve<DuesInvoice, Key = (i32, u32)>
        + Send
        + Sync,
{
    pub fn new(db: &'a DB) -> Self {
        Self { db }
    }

    /// Get an invoice by its number in a year
    pub async fn get_by_number(&self, year: i32, invoice_no: u32) -> Result<DuesInvoice> {
        self.db.retrieve((year, invoice_no)).await
    }

    /// Get all invoices of a member in a year, in order of issue
    pub async fn get_by_member(&self, year: i32, member_id: u32) -> Result<Vec<DuesInvoice>> {
        let invoices: Vec<DuesInvoice> = self
            .db
            .query(&DuesInvoiceFilter {
                year: Some(year),
                member_id: Some(member_id),
                ..Default::default()
            })
            .await?;
        Ok(invoices)
    }

    /// Get all invoices of a year
    pub async fn get_all(&self, year: i32) -> Result<Vec<DuesInvoice>> {
        let invoices: Vec<DuesInvoice> = self
            .db
            .query(&DuesInvoiceFilter {
                year: Some(year),
                ..Default::default()
            })
            .await?;
        Ok(invoices)
    }

    /// Get the reversal invoices of a year
    pub async fn get_reversals(&self, year: i32) -> Result<Vec<DuesInvoice>> {
        let invoices: Vec<DuesInvoice> = self
            .db
            .query(&DuesInvoiceFilter {
                year: Some(year),
                is_reversal: Some(true),
                ..Default::default()
            })
            .await?;
        Ok(invoices)
    }

    /// The next free invoice number of a year. Numbering
    /// starts at 1 and has no gaps.
    pub async fn next_invoice_number(&self, year: i32) -> Result<u32> {
        let max = self
            .get_all(year)
            .await?
            .iter()
            .map(|invoice| invoice.invoice_no)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    /// Invoiced and paid amounts per month of a year.
    /// Payments are counted in the month of the last payment date.
    pub async fn get_monthly_stats(&self, year: i32) -> Result<Vec<MonthlyStats>> {
        let mut months: BTreeMap<NaiveDate, MonthlyStats> = BTreeMap::new();

        for invoice in self.get_all(year).await? {
            let month = invoice.invoice_date.align_start();
            let stats = months.entry(month).or_insert_with(|| MonthlyStats {
                month,
                ..Default::default()
            });
            if invoice.is_reversal {
                stats.amount_invoiced_reversal += invoice.invoice_amount;
            } else {
                stats.amount_invoiced_normal += invoice.invoice_amount;
            }
        }

        let dues: Vec<Dues> = self
            .db
            .query(&DuesFilter {
                year: Some(year),
                paid: Some(true),
                ..Default::default()
            })
            .await?;
        for dues in dues {
            let Some(paid_date) = dues.paid_date else {
                continue;
            };
            let month = paid_date.align_start();
            let stats = months.entry(month).or_insert_with(|| MonthlyStats {
                month,
                ..Default::default()
            });
            stats.amount_paid += dues.amount_paid;
        }

        Ok(months.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use c3s_data::{DuesStart, Insert, Member, Quarter, Update};
    use c3s_db::Connection;

    fn invoice(member: &Member, year: i32, no: u32, date: NaiveDate, amount: i64) -> DuesInvoice {
        let is_reversal = amount < 0;
        DuesInvoice {
            year,
            invoice_no: no,
            invoice_no_string: DuesInvoice::format_invoice_no(year, no, is_reversal),
            invoice_date: date,
            invoice_amount: Decimal::from(amount),
            is_reversal,
            member_id: member.id,
            token: "0123456789".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_next_invoice_number() {
        let db = Connection::open_test().await;
        let repo = DuesInvoiceRepository::new(&db);
        assert_eq!(repo.next_invoice_number(2019).await.unwrap(), 1);

        let member = db.insert(Member::default()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 4, 1).unwrap();
        db.insert(invoice(&member, 2019, 1, date, 50)).await.unwrap();
        db.insert(invoice(&member, 2019, 2, date, -50)).await.unwrap();
        db.insert(invoice(&member, 2020, 1, date, 50)).await.unwrap();

        assert_eq!(repo.next_invoice_number(2019).await.unwrap(), 3);
        assert_eq!(repo.next_invoice_number(2020).await.unwrap(), 2);
        assert_eq!(repo.next_invoice_number(2021).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_number_and_member() {
        let db = Connection::open_test().await;
        let repo = DuesInvoiceRepository::new(&db);
        let m1 = db.insert(Member::default()).await.unwrap();
        let m2 = db.insert(Member::default()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 4, 1).unwrap();
        db.insert(invoice(&m1, 2019, 1, date, 50)).await.unwrap();
        db.insert(invoice(&m2, 2019, 2, date, 25)).await.unwrap();
        db.insert(invoice(&m1, 2019, 3, date, -50)).await.unwrap();

        let invoice = repo.get_by_number(2019, 2).await.unwrap();
        assert_eq!(invoice.member_id, m2.id);
        assert!(repo.get_by_number(2019, 4).await.is_err());

        let invoices = repo.get_by_member(2019, m1.id).await.unwrap();
        let numbers: Vec<u32> = invoices.iter().map(|i| i.invoice_no).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_get_reversals() {
        let db = Connection::open_test().await;
        let repo = DuesInvoiceRepository::new(&db);
        let member = db.insert(Member::default()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 4, 1).unwrap();
        db.insert(invoice(&member, 2019, 1, date, 50)).await.unwrap();
        db.insert(invoice(&member, 2019, 2, date, -50)).await.unwrap();
        db.insert(invoice(&member, 2019, 3, date, 20)).await.unwrap();
        db.insert(invoice(&member, 2020, 1, date, -20)).await.unwrap();

        let reversals = repo.get_reversals(2019).await.unwrap();
        assert_eq!(reversals.len(), 1);
        assert_eq!(reversals[0].invoice_no, 2);
        assert_eq!(reversals[0].invoice_no_string, "C3S-dues2019-0002-S");
        assert!(repo.get_reversals(2021).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_monthly_stats() {
        let db = Connection::open_test().await;
        let repo = DuesInvoiceRepository::new(&db);
        let member = db.insert(Member::default()).await.unwrap();
        let other = db.insert(Member::default()).await.unwrap();

        let march = NaiveDate::from_ymd_opt(2019, 3, 10).unwrap();
        let may = NaiveDate::from_ymd_opt(2019, 5, 20).unwrap();
        db.insert(invoice(&member, 2019, 1, march, 50)).await.unwrap();
        db.insert(invoice(&other, 2019, 2, march, 25)).await.unwrap();
        db.insert(invoice(&member, 2019, 3, may, -50)).await.unwrap();
        db.insert(invoice(&member, 2019, 4, may, 20)).await.unwrap();

        let start = DuesStart {
            quarter: Quarter::Q1,
            year: 2019,
        };
        let mut dues = db
            .insert(Dues::new(other.id, start, Decimal::from(25)))
            .await
            .unwrap();
        dues.record_payment(Decimal::from(25), NaiveDate::from_ymd_opt(2019, 6, 2).unwrap());
        db.update(dues).await.unwrap();

        let stats = repo.get_monthly_stats(2019).await.unwrap();
        assert_eq!(stats.len(), 3);

        assert_eq!(stats[0].month, NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert_eq!(stats[0].amount_invoiced_normal, Decimal::from(75));
        assert_eq!(stats[0].amount_invoiced_reversal, Decimal::ZERO);

        assert_eq!(stats[1].month, NaiveDate::from_ymd_opt(2019, 5, 1).unwrap());
        assert_eq!(stats[1].amount_invoiced_normal, Decimal::from(20));
        assert_eq!(stats[1].amount_invoiced_reversal, Decimal::from(-50));

        assert_eq!(stats[2].month, NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
        assert_eq!(stats[2].amount_paid, Decimal::from(25));
        assert_eq!(stats[2].amount_invoiced_normal, Decimal::ZERO);
    }
}
