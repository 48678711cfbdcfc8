use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use c3s_data::{Delete, Insert, Member, MemberFilter, Query, Retrieve, Update};

use crate::{
    results::{single, Id},
    Connection,
};

const SELECT_MEMBERS: &str = r#"
    SELECT
        id,
        firstname,
        lastname,
        email,
        address1,
        address2,
        postcode,
        city,
        country,
        locale,
        date_of_birth,
        notes,
        date_of_submission,
        membership_type,
        is_legalentity,
        num_shares,
        signature_received,
        signature_received_date,
        payment_received,
        payment_received_date,
        membership_accepted,
        membership_date,
        membership_number,
        membership_loss_date,
        membership_loss_type
    FROM members
    WHERE 1
"#;

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(SELECT_MEMBERS);

        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            let pattern = format!("%{}%", name);
            qry.push(" AND (firstname LIKE ")
                .push_bind(pattern.clone())
                .push(" OR lastname LIKE ")
                .push_bind(pattern.clone())
                .push(" OR (firstname || ' ' || lastname) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email LIKE ").push_bind(email);
        }
        if let Some(number) = filter.membership_number {
            qry.push(" AND membership_number = ").push_bind(number);
        }
        if let Some(accepted) = filter.membership_accepted {
            qry.push(" AND membership_accepted = ").push_bind(accepted);
        }
        qry.push(" ORDER BY id");

        let members: Vec<Member> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(members)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = u32;

    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let member = single(self.query(&filter).await?)?;
        Ok(member)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    async fn insert(&self, member: Member) -> Result<Member> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO members (
                    firstname,
                    lastname,
                    email,
                    address1,
                    address2,
                    postcode,
                    city,
                    country,
                    locale,
                    date_of_birth,
                    notes,
                    date_of_submission,
                    membership_type,
                    is_legalentity,
                    num_shares,
                    signature_received,
                    signature_received_date,
                    payment_received,
                    payment_received_date,
                    membership_accepted,
                    membership_date,
                    membership_number,
                    membership_loss_date,
                    membership_loss_type
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&member.firstname)
                .push_bind(&member.lastname)
                .push_bind(&member.email)
                .push_bind(&member.address1)
                .push_bind(&member.address2)
                .push_bind(&member.postcode)
                .push_bind(&member.city)
                .push_bind(&member.country)
                .push_bind(&member.locale)
                .push_bind(member.date_of_birth)
                .push_bind(&member.notes)
                .push_bind(member.date_of_submission)
                .push_bind(member.membership_type)
                .push_bind(member.is_legalentity)
                .push_bind(member.num_shares)
                .push_bind(member.signature_received)
                .push_bind(member.signature_received_date)
                .push_bind(member.payment_received)
                .push_bind(member.payment_received_date)
                .push_bind(member.membership_accepted)
                .push_bind(member.membership_date)
                .push_bind(member.membership_number)
                .push_bind(member.membership_loss_date)
                .push_bind(member.membership_loss_type);

            qry.push(") RETURNING id ")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        tracing::debug!(member_id = insert.id, "inserted member");
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE members SET")
                .push(" firstname = ")
                .push_bind(&member.firstname)
                .push(", lastname = ")
                .push_bind(&member.lastname)
                .push(", email = ")
                .push_bind(&member.email)
                .push(", address1 = ")
                .push_bind(&member.address1)
                .push(", address2 = ")
                .push_bind(&member.address2)
                .push(", postcode = ")
                .push_bind(&member.postcode)
                .push(", city = ")
                .push_bind(&member.city)
                .push(", country = ")
                .push_bind(&member.country)
                .push(", locale = ")
                .push_bind(&member.locale)
                .push(", date_of_birth = ")
                .push_bind(member.date_of_birth)
                .push(", notes = ")
                .push_bind(&member.notes)
                .push(", date_of_submission = ")
                .push_bind(member.date_of_submission)
                .push(", membership_type = ")
                .push_bind(member.membership_type)
                .push(", is_legalentity = ")
                .push_bind(member.is_legalentity)
                .push(", num_shares = ")
                .push_bind(member.num_shares)
                .push(", signature_received = ")
                .push_bind(member.signature_received)
                .push(", signature_received_date = ")
                .push_bind(member.signature_received_date)
                .push(", payment_received = ")
                .push_bind(member.payment_received)
                .push(", payment_received_date = ")
                .push_bind(member.payment_received_date)
                .push(", membership_accepted = ")
                .push_bind(member.membership_accepted)
                .push(", membership_date = ")
                .push_bind(member.membership_date)
                .push(", membership_number = ")
                .push_bind(member.membership_number)
                .push(", membership_loss_date = ")
                .push_bind(member.membership_loss_date)
                .push(", membership_loss_type = ")
                .push_bind(member.membership_loss_type)
                .push(" WHERE id = ")
                .push_bind(member.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl Delete<Member> for Connection {
    /// Delete member
    async fn delete(&self, member: Member) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id = ")
            .push_bind(member.id)
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
    use c3s_data::{MembershipLossType, MembershipType};

    #[tokio::test]
    async fn test_member_insert() {
        let db = Connection::open_test().await;
        let submitted = NaiveDate::from_ymd_opt(2018, 8, 20).unwrap();
        let member = Member {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            city: "London".to_string(),
            date_of_submission: submitted,
            membership_type: MembershipType::Investing,
            num_shares: 3,
            ..Member::default()
        };
        let member = db.insert(member).await.unwrap();

        assert!(member.id > 0);
        assert_eq!(member.full_name(), "Ada Lovelace");
        assert_eq!(member.email, "ada@example.org");
        assert_eq!(member.city, "London");
        assert_eq!(member.date_of_submission, submitted);
        assert_eq!(member.membership_type, MembershipType::Investing);
        assert_eq!(member.num_shares, 3);
        assert!(!member.membership_accepted);
        assert_eq!(member.membership_number, None);
        assert_eq!(member.membership_loss_type, None);
    }

    #[tokio::test]
    async fn test_member_update() {
        let db = Connection::open_test().await;
        let member = Member {
            firstname: "Test".to_string(),
            lastname: "Member".to_string(),
            ..Member::default()
        };
        let mut member = db.insert(member).await.unwrap();
        member.email = "new@example.org".to_string();
        member.membership_accepted = true;
        member.membership_date = Some(NaiveDate::from_ymd_opt(2018, 9, 1).unwrap());
        member.membership_number = Some(23);
        member.membership_loss_date = Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        member.membership_loss_type = Some(MembershipLossType::Resignation);
        member.notes = "changed".to_string();

        let member = db.update(member).await.unwrap();
        assert_eq!(member.email, "new@example.org");
        assert!(member.membership_accepted);
        assert_eq!(
            member.membership_date,
            Some(NaiveDate::from_ymd_opt(2018, 9, 1).unwrap())
        );
        assert_eq!(member.membership_number, Some(23));
        assert_eq!(
            member.membership_loss_type,
            Some(MembershipLossType::Resignation)
        );
        assert_eq!(member.notes, "changed");
    }

    #[tokio::test]
    async fn test_member_query_name_like() {
        let db = Connection::open_test().await;
        db.insert(Member {
            firstname: "Grace".to_string(),
            lastname: "Hopper".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Member {
            firstname: "Alan".to_string(),
            lastname: "Turing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let by_last: Vec<Member> = db
            .query(&MemberFilter {
                name: Some("hOpP".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_last.len(), 1);
        assert_eq!(by_last[0].firstname, "Grace");

        let by_full: Vec<Member> = db
            .query(&MemberFilter {
                name: Some("alan turing".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_full.len(), 1);

        let none: Vec<Member> = db
            .query(&MemberFilter {
                name: Some("Lovelace".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_member_query_accepted() {
        let db = Connection::open_test().await;
        db.insert(Member {
            firstname: "Applicant".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Member {
            firstname: "Member".to_string(),
            membership_accepted: true,
            membership_number: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();

        let members: Vec<Member> = db
            .query(&MemberFilter {
                membership_accepted: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].firstname, "Member");

        let member: Vec<Member> = db
            .query(&MemberFilter {
                membership_number: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(member.len(), 1);
    }

    #[tokio::test]
    async fn test_member_delete() {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                firstname: "Test".to_string(),
                ..Member::default()
            })
            .await
            .unwrap();
        let member_id = member.id;

        db.delete(member).await.unwrap();

        let result: Result<Member> = db.retrieve(member_id).await;
        assert!(result.is_err());
    }
}
