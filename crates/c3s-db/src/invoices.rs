use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use c3s_data::{DuesInvoice, DuesInvoiceFilter, Insert, Query, Retrieve, Update};

use crate::{results::single, Connection};

#[async_trait]
impl Query<DuesInvoice> for Connection {
    type Filter = DuesInvoiceFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<DuesInvoice>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                year,
                invoice_no,
                invoice_no_string,
                invoice_date,
                invoice_amount,
                is_reversal,
                is_cancelled,
                is_altered,
                preceding_invoice_no,
                succeeding_invoice_no,
                member_id,
                membership_no,
                email,
                token
            FROM dues_invoices
            WHERE 1
            "#,
        );
        if let Some(year) = filter.year {
            qry.push(" AND year = ").push_bind(year);
        }
        if let Some(invoice_no) = filter.invoice_no {
            qry.push(" AND invoice_no = ").push_bind(invoice_no);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        if let Some(is_reversal) = filter.is_reversal {
            qry.push(" AND is_reversal = ").push_bind(is_reversal);
        }
        qry.push(" ORDER BY year, invoice_no");

        let invoices: Vec<DuesInvoice> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(invoices)
    }
}

#[async_trait]
impl Retrieve<DuesInvoice> for Connection {
    type Key = (i32, u32);

    /// Get an invoice by year and invoice number
    async fn retrieve(&self, (year, invoice_no): Self::Key) -> Result<DuesInvoice> {
        let filter = DuesInvoiceFilter {
            year: Some(year),
            invoice_no: Some(invoice_no),
            ..Default::default()
        };
        let invoice = single(self.query(&filter).await?)?;
        Ok(invoice)
    }
}

#[async_trait]
impl Insert<DuesInvoice> for Connection {
    async fn insert(&self, invoice: DuesInvoice) -> Result<DuesInvoice> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO dues_invoices (
                    year,
                    invoice_no,
                    invoice_no_string,
                    invoice_date,
                    invoice_amount,
                    is_reversal,
                    is_cancelled,
                    is_altered,
                    preceding_invoice_no,
                    succeeding_invoice_no,
                    member_id,
                    membership_no,
                    email,
                    token
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(invoice.year)
                .push_bind(invoice.invoice_no)
                .push_bind(&invoice.invoice_no_string)
                .push_bind(invoice.invoice_date)
                .push_bind(invoice.invoice_amount.to_string())
                .push_bind(invoice.is_reversal)
                .push_bind(invoice.is_cancelled)
                .push_bind(invoice.is_altered)
                .push_bind(invoice.preceding_invoice_no)
                .push_bind(invoice.succeeding_invoice_no)
                .push_bind(invoice.member_id)
                .push_bind(invoice.membership_no)
                .push_bind(&invoice.email)
                .push_bind(&invoice.token);
            qry.push(")");
            qry.build().execute(&mut *conn).await?;
        }
        tracing::debug!(
            invoice_no = %invoice.invoice_no_string,
            amount = %invoice.invoice_amount,
            "inserted dues invoice"
        );
        self.retrieve((invoice.year, invoice.invoice_no)).await
    }
}

#[async_trait]
impl Update<DuesInvoice> for Connection {
    /// Update the state flags and chain links of an invoice.
    /// Number, amount and recipient are fixed once issued.
    async fn update(&self, invoice: DuesInvoice) -> Result<DuesInvoice> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE dues_invoices SET")
                .push(" is_cancelled = ")
                .push_bind(invoice.is_cancelled)
                .push(", is_altered = ")
                .push_bind(invoice.is_altered)
                .push(", preceding_invoice_no = ")
                .push_bind(invoice.preceding_invoice_no)
                .push(", succeeding_invoice_no = ")
                .push_bind(invoice.succeeding_invoice_no)
                .push(" WHERE year = ")
                .push_bind(invoice.year)
                .push(" AND invoice_no = ")
                .push_bind(invoice.invoice_no)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve((invoice.year, invoice.invoice_no)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use c3s_data::Member;

    fn make_invoice(member: &Member, year: i32, invoice_no: u32) -> DuesInvoice {
        DuesInvoice {
            year,
            invoice_no,
            invoice_no_string: DuesInvoice::format_invoice_no(year, invoice_no, false),
            invoice_date: NaiveDate::from_ymd_opt(year, 5, 1).unwrap(),
            invoice_amount: Decimal::new(3750, 2),
            member_id: member.id,
            membership_no: member.membership_number,
            email: member.email.clone(),
            token: "0123456789".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invoice_insert() {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                firstname: "Test".to_string(),
                email: "test@example.org".to_string(),
                membership_number: Some(42),
                ..Default::default()
            })
            .await
            .unwrap();

        let invoice = db.insert(make_invoice(&member, 2019, 1)).await.unwrap();
        assert!(invoice.id > 0);
        assert_eq!(invoice.invoice_no_string, "C3S-dues2019-0001");
        assert_eq!(invoice.invoice_amount, Decimal::new(3750, 2));
        assert_eq!(invoice.membership_no, Some(42));
        assert_eq!(invoice.email, "test@example.org");
        assert!(!invoice.is_reversal);
        assert_eq!(invoice.get_member(&db).await.unwrap().id, member.id);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_unique_per_year() {
        let db = Connection::open_test().await;
        let member = db.insert(Member::default()).await.unwrap();

        db.insert(make_invoice(&member, 2019, 1)).await.unwrap();
        db.insert(make_invoice(&member, 2020, 1)).await.unwrap();
        let duplicate = db.insert(make_invoice(&member, 2019, 1)).await;
        assert!(duplicate.is_err());

        let invoices: Vec<DuesInvoice> = db
            .query(&DuesInvoiceFilter {
                member_id: Some(member.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(invoices.len(), 2);
    }

    #[tokio::test]
    async fn test_invoice_update_links() {
        let db = Connection::open_test().await;
        let member = db.insert(Member::default()).await.unwrap();

        let mut invoice = db.insert(make_invoice(&member, 2019, 1)).await.unwrap();
        invoice.is_cancelled = true;
        invoice.succeeding_invoice_no = Some(2);
        invoice.invoice_amount = Decimal::from(1000);
        let invoice = db.update(invoice).await.unwrap();

        assert!(invoice.is_cancelled);
        assert_eq!(invoice.succeeding_invoice_no, Some(2));
        // the amount is not touched by updates
        assert_eq!(invoice.invoice_amount, Decimal::new(3750, 2));
    }
}
