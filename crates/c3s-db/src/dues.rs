use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite};

use c3s_data::{Dues, DuesFilter, Insert, Query, Retrieve, Update};

use crate::{results::single, Connection};

fn optional_amount(amount: Option<Decimal>) -> Option<String> {
    amount.map(|a| a.to_string())
}

#[async_trait]
impl Query<Dues> for Connection {
    type Filter = DuesFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Dues>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                member_id,
                year,
                start,
                amount,
                amount_reduced,
                reduced,
                balance,
                balanced,
                paid,
                amount_paid,
                paid_date,
                invoice_no,
                invoice_date,
                token
            FROM dues
            WHERE 1
            "#,
        );
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        if let Some(year) = filter.year {
            qry.push(" AND year = ").push_bind(year);
        }
        if let Some(paid) = filter.paid {
            qry.push(" AND paid = ").push_bind(paid);
        }
        qry.push(" ORDER BY year, member_id");

        let dues: Vec<Dues> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(dues)
    }
}

#[async_trait]
impl Retrieve<Dues> for Connection {
    type Key = (u32, i32);

    /// Get the dues of a member for a year
    async fn retrieve(&self, (member_id, year): Self::Key) -> Result<Dues> {
        let filter = DuesFilter {
            member_id: Some(member_id),
            year: Some(year),
            ..Default::default()
        };
        let dues = single(self.query(&filter).await?)?;
        Ok(dues)
    }
}

#[async_trait]
impl Insert<Dues> for Connection {
    async fn insert(&self, dues: Dues) -> Result<Dues> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO dues (
                    member_id,
                    year,
                    start,
                    amount,
                    amount_reduced,
                    reduced,
                    balance,
                    balanced,
                    paid,
                    amount_paid,
                    paid_date,
                    invoice_no,
                    invoice_date,
                    token
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(dues.member_id)
                .push_bind(dues.year)
                .push_bind(dues.start.to_string())
                .push_bind(dues.amount.to_string())
                .push_bind(optional_amount(dues.amount_reduced))
                .push_bind(dues.reduced)
                .push_bind(dues.balance.to_string())
                .push_bind(dues.balanced)
                .push_bind(dues.paid)
                .push_bind(dues.amount_paid.to_string())
                .push_bind(dues.paid_date)
                .push_bind(dues.invoice_no)
                .push_bind(dues.invoice_date)
                .push_bind(&dues.token);
            qry.push(")");
            qry.build().execute(&mut *conn).await?;
        }
        self.retrieve((dues.member_id, dues.year)).await
    }
}

#[async_trait]
impl Update<Dues> for Connection {
    async fn update(&self, dues: Dues) -> Result<Dues> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE dues SET")
                .push(" start = ")
                .push_bind(dues.start.to_string())
                .push(", amount = ")
                .push_bind(dues.amount.to_string())
                .push(", amount_reduced = ")
                .push_bind(optional_amount(dues.amount_reduced))
                .push(", reduced = ")
                .push_bind(dues.reduced)
                .push(", balance = ")
                .push_bind(dues.balance.to_string())
                .push(", balanced = ")
                .push_bind(dues.balanced)
                .push(", paid = ")
                .push_bind(dues.paid)
                .push(", amount_paid = ")
                .push_bind(dues.amount_paid.to_string())
                .push(", paid_date = ")
                .push_bind(dues.paid_date)
                .push(", invoice_no = ")
                .push_bind(dues.invoice_no)
                .push(", invoice_date = ")
                .push_bind(dues.invoice_date)
                .push(", token = ")
                .push_bind(&dues.token)
                .push(" WHERE member_id = ")
                .push_bind(dues.member_id)
                .push(" AND year = ")
                .push_bind(dues.year)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve((dues.member_id, dues.year)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use c3s_data::{DuesStart, Member, Quarter};

    async fn make_member(db: &Connection) -> Member {
        db.insert(Member {
            firstname: "Test".to_string(),
            lastname: "Member".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_dues_insert() {
        let db = Connection::open_test().await;
        let member = make_member(&db).await;
        let start = DuesStart {
            quarter: Quarter::Q2,
            year: 2019,
        };
        let dues = db
            .insert(Dues::new(member.id, start, Decimal::new(3750, 2)))
            .await
            .unwrap();

        assert_eq!(dues.member_id, member.id);
        assert_eq!(dues.year, 2019);
        assert_eq!(dues.start, start);
        assert_eq!(dues.amount, Decimal::new(3750, 2));
        assert_eq!(dues.balance, Decimal::new(3750, 2));
        assert!(!dues.balanced);
        assert_eq!(dues.amount_reduced, None);
        assert_eq!(dues.invoice_no, None);
    }

    #[tokio::test]
    async fn test_dues_update() {
        let db = Connection::open_test().await;
        let member = make_member(&db).await;
        let start = DuesStart {
            quarter: Quarter::Q1,
            year: 2020,
        };
        let mut dues = db
            .insert(Dues::new(member.id, start, Decimal::from(50)))
            .await
            .unwrap();

        dues.set_amount_reduced(Decimal::new(1250, 2));
        dues.record_payment(
            Decimal::new(1250, 2),
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        );
        dues.invoice_no = Some(7);
        dues.token = Some("abcdefghij".to_string());
        let dues = db.update(dues).await.unwrap();

        assert!(dues.reduced);
        assert_eq!(dues.amount_reduced, Some(Decimal::new(1250, 2)));
        assert_eq!(dues.amount_paid, Decimal::new(1250, 2));
        assert_eq!(dues.balance, Decimal::ZERO);
        assert!(dues.balanced);
        assert!(dues.paid);
        assert_eq!(dues.invoice_no, Some(7));
        assert_eq!(dues.token, Some("abcdefghij".to_string()));
    }

    #[tokio::test]
    async fn test_dues_per_year() {
        let db = Connection::open_test().await;
        let member = make_member(&db).await;
        for year in [2018, 2019, 2020] {
            let start = DuesStart {
                quarter: Quarter::Q1,
                year,
            };
            db.insert(Dues::new(member.id, start, Decimal::from(50)))
                .await
                .unwrap();
        }

        let all = member.get_dues(&db).await.unwrap();
        assert_eq!(all.len(), 3);

        let dues: Dues = db.retrieve((member.id, 2019)).await.unwrap();
        assert_eq!(dues.year, 2019);

        let missing: Result<Dues> = db.retrieve((member.id, 2021)).await;
        assert!(missing.is_err());
    }
}
