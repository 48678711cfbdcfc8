use chrono::{NaiveDate, NaiveDateTime};

use c3s_data::{
    make_token, GeneralAssembly, GeneralAssemblyFilter, Insert, Invitation, InvitationFilter,
    Member, MemberFilter, Query, Retrieve, Transaction, Update,
};

use crate::errors::AssemblyError;

async fn find_assembly<DB>(db: &DB, number: u32) -> Result<GeneralAssembly, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter> + Send + Sync,
{
    let assemblies: Vec<GeneralAssembly> = db
        .query(&GeneralAssemblyFilter {
            number: Some(number),
            ..Default::default()
        })
        .await?;
    assemblies
        .into_iter()
        .next()
        .ok_or(AssemblyError::NotFound(number))
}

/// Create a general assembly with the next free number
pub async fn create_assembly<DB>(
    db: &DB,
    name: &str,
    date: NaiveDate,
) -> Result<GeneralAssembly, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter>
        + Insert<GeneralAssembly>
        + Transaction
        + Send
        + Sync,
{
    if name.trim().is_empty() {
        return Err(AssemblyError::EmptyName);
    }

    db.begin().await?;
    let result: Result<GeneralAssembly, AssemblyError> = async {
        let assemblies: Vec<GeneralAssembly> =
            db.query(&GeneralAssemblyFilter::default()).await?;
        let number = assemblies.iter().map(|a| a.number).max().unwrap_or(0) + 1;
        let assembly = db
            .insert(GeneralAssembly {
                number,
                name: name.to_string(),
                date,
            })
            .await?;
        Ok(assembly)
    }
    .await;
    let assembly = db.finish(result).await?;
    tracing::info!(number = assembly.number, %date, "created general assembly");
    Ok(assembly)
}

/// Change name and date of an existing assembly
pub async fn edit_assembly<DB>(
    db: &DB,
    number: u32,
    name: &str,
    date: NaiveDate,
) -> Result<GeneralAssembly, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter>
        + Update<GeneralAssembly>
        + Send
        + Sync,
{
    if name.trim().is_empty() {
        return Err(AssemblyError::EmptyName);
    }
    let assembly = find_assembly(db, number).await?;
    let assembly = db
        .update(GeneralAssembly {
            name: name.to_string(),
            date,
            ..assembly
        })
        .await?;
    tracing::info!(number, %date, "updated general assembly");
    Ok(assembly)
}

/// Invite a member to an upcoming assembly.
///
/// Inviting a member a second time refreshes the time the
/// invitation was sent and keeps its token.
pub async fn invite_member<DB>(
    db: &DB,
    number: u32,
    member_id: u32,
    sent_at: NaiveDateTime,
) -> Result<Invitation, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter>
        + Retrieve<Member, Key = u32>
        + Query<Invitation, Filter = InvitationFilter>
        + Insert<Invitation>
        + Update<Invitation>
        + Transaction
        + Send
        + Sync,
{
    db.begin().await?;
    let result = write_invitation(db, number, member_id, sent_at).await;
    let invitation = db.finish(result).await?;

    tracing::info!(number, member_id, %sent_at, "invited member");
    Ok(invitation)
}

async fn write_invitation<DB>(
    db: &DB,
    number: u32,
    member_id: u32,
    sent_at: NaiveDateTime,
) -> Result<Invitation, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter>
        + Retrieve<Member, Key = u32>
        + Query<Invitation, Filter = InvitationFilter>
        + Insert<Invitation>
        + Update<Invitation>
        + Send
        + Sync,
{
    let assembly = find_assembly(db, number).await?;
    if assembly.date < sent_at.date() {
        return Err(AssemblyError::InPast(number, assembly.date));
    }
    let member: Member = db.retrieve(member_id).await?;
    if !member.is_member(assembly.date) {
        return Err(AssemblyError::NotAMember(member_id));
    }

    let existing: Vec<Invitation> = db
        .query(&InvitationFilter {
            general_assembly_number: Some(number),
            member_id: Some(member_id),
        })
        .await?;
    let invitation = match existing.into_iter().next() {
        Some(invitation) => {
            db.update(Invitation {
                sent_at,
                ..invitation
            })
            .await?
        }
        None => {
            db.insert(Invitation {
                general_assembly_number: number,
                member_id,
                sent_at,
                token: make_token(),
            })
            .await?
        }
    };
    Ok(invitation)
}

/// Members eligible for an assembly who have not been invited yet,
/// ordered by membership number.
pub async fn get_invitees<DB>(
    db: &DB,
    number: u32,
    limit: usize,
) -> Result<Vec<Member>, AssemblyError>
where
    DB: Query<GeneralAssembly, Filter = GeneralAssemblyFilter>
        + Query<Member, Filter = MemberFilter>
        + Query<Invitation, Filter = InvitationFilter>
        + Send
        + Sync,
{
    let assembly = find_assembly(db, number).await?;
    let invited: Vec<Invitation> = db
        .query(&InvitationFilter {
            general_assembly_number: Some(number),
            ..Default::default()
        })
        .await?;
    let members: Vec<Member> = db
        .query(&MemberFilter {
            membership_accepted: Some(true),
            ..Default::default()
        })
        .await?;

    let mut invitees: Vec<Member> = members
        .into_iter()
        .filter(|m| m.is_member(assembly.date))
        .filter(|m| !invited.iter().any(|i| i.member_id == m.id))
        .collect();
    invitees.sort_by_key(|m| m.membership_number);
    invitees.truncate(limit);
    Ok(invitees)
}
