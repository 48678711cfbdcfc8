use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use c3s_data::{
    GeneralAssembly, GeneralAssemblyFilter, Insert, Invitation, InvitationFilter, Query,
    Retrieve, Update,
};

use crate::{results::single, Connection};

#[async_trait]
impl Query<GeneralAssembly> for Connection {
    type Filter = GeneralAssemblyFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<GeneralAssembly>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT number, name, date FROM general_assemblies WHERE 1",
        );
        if let Some(number) = filter.number {
            qry.push(" AND number = ").push_bind(number);
        }
        if let Some(date) = filter.date_after {
            qry.push(" AND date >= ").push_bind(date);
        }
        qry.push(" ORDER BY number");

        let assemblies: Vec<GeneralAssembly> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(assemblies)
    }
}

#[async_trait]
impl Retrieve<GeneralAssembly> for Connection {
    type Key = u32;

    async fn retrieve(&self, number: Self::Key) -> Result<GeneralAssembly> {
        let filter = GeneralAssemblyFilter {
            number: Some(number),
            ..Default::default()
        };
        let assembly = single(self.query(&filter).await?)?;
        Ok(assembly)
    }
}

#[async_trait]
impl Insert<GeneralAssembly> for Connection {
    async fn insert(&self, assembly: GeneralAssembly) -> Result<GeneralAssembly> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                "INSERT INTO general_assemblies (number, name, date) VALUES (",
            );
            qry.separated(", ")
                .push_bind(assembly.number)
                .push_bind(&assembly.name)
                .push_bind(assembly.date);
            qry.push(")");
            qry.build().execute(&mut *conn).await?;
        }
        self.retrieve(assembly.number).await
    }
}

#[async_trait]
impl Update<GeneralAssembly> for Connection {
    async fn update(&self, assembly: GeneralAssembly) -> Result<GeneralAssembly> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE general_assemblies SET")
                .push(" name = ")
                .push_bind(&assembly.name)
                .push(", date = ")
                .push_bind(assembly.date)
                .push(" WHERE number = ")
                .push_bind(assembly.number)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(assembly.number).await
    }
}

#[async_trait]
impl Query<Invitation> for Connection {
    type Filter = InvitationFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Invitation>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                general_assembly_number,
                member_id,
                sent_at,
                token
            FROM general_assembly_invitations
            WHERE 1
            "#,
        );
        if let Some(number) = filter.general_assembly_number {
            qry.push(" AND general_assembly_number = ").push_bind(number);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY general_assembly_number, member_id");

        let invitations: Vec<Invitation> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(invitations)
    }
}

#[async_trait]
impl Retrieve<Invitation> for Connection {
    type Key = (u32, u32);

    /// Get the invitation of a member to an assembly
    async fn retrieve(&self, (number, member_id): Self::Key) -> Result<Invitation> {
        let filter = InvitationFilter {
            general_assembly_number: Some(number),
            member_id: Some(member_id),
        };
        let invitation = single(self.query(&filter).await?)?;
        Ok(invitation)
    }
}

#[async_trait]
impl Insert<Invitation> for Connection {
    async fn insert(&self, invitation: Invitation) -> Result<Invitation> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO general_assembly_invitations (
                    general_assembly_number,
                    member_id,
                    sent_at,
                    token
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(invitation.general_assembly_number)
                .push_bind(invitation.member_id)
                .push_bind(invitation.sent_at)
                .push_bind(&invitation.token);
            qry.push(")");
            qry.build().execute(&mut *conn).await?;
        }
        self.retrieve((invitation.general_assembly_number, invitation.member_id))
            .await
    }
}

#[async_trait]
impl Update<Invitation> for Connection {
    async fn update(&self, invitation: Invitation) -> Result<Invitation> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE general_assembly_invitations SET")
                .push(" sent_at = ")
                .push_bind(invitation.sent_at)
                .push(", token = ")
                .push_bind(&invitation.token)
                .push(" WHERE general_assembly_number = ")
                .push_bind(invitation.general_assembly_number)
                .push(" AND member_id = ")
                .push_bind(invitation.member_id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve((invitation.general_assembly_number, invitation.member_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use c3s_data::Member;

    #[tokio::test]
    async fn test_assembly_insert_and_update() {
        let db = Connection::open_test().await;
        let assembly = db
            .insert(GeneralAssembly {
                number: 1,
                name: "1. Generalversammlung".to_string(),
                date: NaiveDate::from_ymd_opt(2014, 8, 23).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(assembly.number, 1);

        let mut assembly = assembly;
        assembly.name = "Erste Generalversammlung".to_string();
        let assembly = db.update(assembly).await.unwrap();
        assert_eq!(assembly.name, "Erste Generalversammlung");

        let upcoming: Vec<GeneralAssembly> = db
            .query(&GeneralAssemblyFilter {
                date_after: NaiveDate::from_ymd_opt(2015, 1, 1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(upcoming.is_empty());
    }

    #[tokio::test]
    async fn test_invitation_insert_and_update() {
        let db = Connection::open_test().await;
        let member = db.insert(Member::default()).await.unwrap();
        let assembly = db
            .insert(GeneralAssembly {
                number: 1,
                name: "GV".to_string(),
                date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            })
            .await
            .unwrap();

        let sent_at = NaiveDate::from_ymd_opt(2030, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let invitation = db
            .insert(Invitation {
                general_assembly_number: assembly.number,
                member_id: member.id,
                sent_at,
                token: "abcdefghij".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(invitation.sent_at, sent_at);

        // A member is invited only once per assembly
        let again = db.insert(invitation.clone()).await;
        assert!(again.is_err());

        let resent_at = sent_at + chrono::Duration::days(3);
        let invitation = db
            .update(Invitation {
                sent_at: resent_at,
                ..invitation
            })
            .await
            .unwrap();
        assert_eq!(invitation.sent_at, resent_at);
        assert_eq!(invitation.token, "abcdefghij");
    }
}
