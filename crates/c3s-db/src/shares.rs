use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use c3s_data::{Delete, Insert, Query, Retrieve, Shares, SharesFilter};

use crate::{
    results::{single, Id},
    Connection,
};

#[async_trait]
impl Query<Shares> for Connection {
    type Filter = SharesFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Shares>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                member_id,
                number,
                date_of_acquisition,
                reference_code
            FROM shares
            WHERE 1
            "#,
        );
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY date_of_acquisition, id");

        let shares: Vec<Shares> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(shares)
    }
}

#[async_trait]
impl Retrieve<Shares> for Connection {
    type Key = u32;

    async fn retrieve(&self, shares_id: Self::Key) -> Result<Shares> {
        let shares: Shares = {
            let mut conn = self.lock().await;
            sqlx::query_as::<_, Shares>(
                r#"
                SELECT
                    id,
                    member_id,
                    number,
                    date_of_acquisition,
                    reference_code
                FROM shares
                WHERE id = ?
                "#,
            )
            .bind(shares_id)
            .fetch_all(&mut *conn)
            .await
            .map(single)??
        };
        Ok(shares)
    }
}

#[async_trait]
impl Insert<Shares> for Connection {
    async fn insert(&self, shares: Shares) -> Result<Shares> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO shares (
                    member_id,
                    number,
                    date_of_acquisition,
                    reference_code
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(shares.member_id)
                .push_bind(shares.number)
                .push_bind(shares.date_of_acquisition)
                .push_bind(&shares.reference_code);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<Shares> for Connection {
    async fn delete(&self, shares: Shares) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM shares WHERE id = ")
            .push_bind(shares.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use c3s_data::{count_shares, Member};

    #[tokio::test]
    async fn test_member_shares() {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                firstname: "Test".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = db
            .insert(Shares {
                member_id: member.id,
                number: 3,
                date_of_acquisition: NaiveDate::from_ymd_opt(2018, 9, 1).unwrap(),
                reference_code: "REF-1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(first.id > 0);
        assert_eq!(first.reference_code, "REF-1");

        db.insert(Shares {
            member_id: member.id,
            number: 2,
            date_of_acquisition: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();

        let packages = member.get_shares(&db).await.unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(count_shares(&packages), 5);

        db.delete(first).await.unwrap();
        let packages = member.get_shares(&db).await.unwrap();
        assert_eq!(count_shares(&packages), 2);
    }
}
