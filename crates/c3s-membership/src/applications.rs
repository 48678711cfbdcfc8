use chrono::NaiveDate;

use c3s_data::{
    make_token, Insert, Member, MemberFilter, MembershipLossType, Query, Retrieve, Shares,
    Transaction, Update, MAX_SHARES_PER_MEMBER,
};

use crate::errors::MembershipError;

/// Check the applicant data and store the application.
/// All membership state of the given record is reset, an
/// application always starts out unsigned and unpaid.
pub async fn submit_application<DB>(
    db: &DB,
    applicant: Member,
    date_of_submission: NaiveDate,
) -> Result<Member, MembershipError>
where
    DB: Query<Member, Filter = MemberFilter> + Insert<Member> + Transaction + Send + Sync,
{
    if applicant.firstname.trim().is_empty() {
        return Err(MembershipError::InvalidApplication(
            "first name is missing".to_string(),
        ));
    }
    if !applicant.is_legalentity && applicant.lastname.trim().is_empty() {
        return Err(MembershipError::InvalidApplication(
            "last name is missing".to_string(),
        ));
    }
    if !applicant.email.contains('@') {
        return Err(MembershipError::InvalidApplication(format!(
            "not an email address: {}",
            applicant.email
        )));
    }
    if applicant.num_shares < 1 || applicant.num_shares > MAX_SHARES_PER_MEMBER {
        return Err(MembershipError::InvalidApplication(format!(
            "between 1 and {} shares can be requested",
            MAX_SHARES_PER_MEMBER
        )));
    }

    db.begin().await?;
    let result: Result<Member, MembershipError> = async {
        let existing: Vec<Member> = db
            .query(&MemberFilter {
                email: Some(applicant.email.clone()),
                ..Default::default()
            })
            .await?;
        if !existing.is_empty() {
            return Err(MembershipError::DuplicateEmail(applicant.email));
        }

        let member = db
            .insert(Member {
                id: 0,
                date_of_submission,
                signature_received: false,
                signature_received_date: None,
                payment_received: false,
                payment_received_date: None,
                membership_accepted: false,
                membership_date: None,
                membership_number: None,
                membership_loss_date: None,
                membership_loss_type: None,
                ..applicant
            })
            .await?;
        Ok(member)
    }
    .await;
    let member = db.finish(result).await?;

    tracing::info!(member_id = member.id, email = %member.email, "application submitted");
    Ok(member)
}

/// Mark the signed application form as received
pub async fn record_signature<DB>(
    db: &DB,
    member_id: u32,
    date: NaiveDate,
) -> Result<Member, MembershipError>
where
    DB: Retrieve<Member, Key = u32> + Update<Member> + Send + Sync,
{
    let member = db.retrieve(member_id).await?;
    let member = db
        .update(Member {
            signature_received: true,
            signature_received_date: Some(date),
            ..member
        })
        .await?;
    tracing::info!(member_id, %date, "signature received");
    Ok(member)
}

/// Mark the payment for the requested shares as received
pub async fn record_payment<DB>(
    db: &DB,
    member_id: u32,
    date: NaiveDate,
) -> Result<Member, MembershipError>
where
    DB: Retrieve<Member, Key = u32> + Update<Member> + Send + Sync,
{
    let member = db.retrieve(member_id).await?;
    let member = db
        .update(Member {
            payment_received: true,
            payment_received_date: Some(date),
            ..member
        })
        .await?;
    tracing::info!(member_id, %date, "share payment received");
    Ok(member)
}

/// The next free membership number
pub async fn next_membership_number<DB>(db: &DB) -> anyhow::Result<u32>
where
    DB: Query<Member, Filter = MemberFilter> + Send + Sync,
{
    let members: Vec<Member> = db
        .query(&MemberFilter {
            membership_accepted: Some(true),
            ..Default::default()
        })
        .await?;
    let max = members
        .iter()
        .filter_map(|m| m.membership_number)
        .max()
        .unwrap_or(0);
    Ok(max + 1)
}

/// Accept an application as membership.
///
/// Signature and payment must both be received. The member gets
/// the next membership number and the requested shares are
/// recorded as the first package.
pub async fn accept_membership<DB>(
    db: &DB,
    member_id: u32,
    membership_date: NaiveDate,
) -> Result<Member, MembershipError>
where
    DB: Query<Member, Filter = MemberFilter>
        + Retrieve<Member, Key = u32>
        + Update<Member>
        + Insert<Shares>
        + Transaction
        + Send
        + Sync,
{
    db.begin().await?;
    let result = write_acceptance(db, member_id, membership_date).await;
    let member = db.finish(result).await?;

    tracing::info!(
        member_id,
        membership_number = member.membership_number,
        shares = member.num_shares,
        "membership accepted"
    );
    Ok(member)
}

async fn write_acceptance<DB>(
    db: &DB,
    member_id: u32,
    membership_date: NaiveDate,
) -> Result<Member, MembershipError>
where
    DB: Query<Member, Filter = MemberFilter>
        + Retrieve<Member, Key = u32>
        + Update<Member>
        + Insert<Shares>
        + Send
        + Sync,
{
    let member = db.retrieve(member_id).await?;
    if member.membership_accepted {
        return Err(MembershipError::AlreadyAccepted(member_id));
    }
    if !member.signature_received {
        return Err(MembershipError::SignatureMissing(member_id));
    }
    if !member.payment_received {
        return Err(MembershipError::PaymentMissing(member_id));
    }

    let membership_number = next_membership_number(db).await?;
    db.insert(Shares {
        member_id,
        number: member.num_shares,
        date_of_acquisition: member.payment_received_date.unwrap_or(membership_date),
        reference_code: make_token(),
        ..Default::default()
    })
    .await?;

    let member = db
        .update(Member {
            membership_accepted: true,
            membership_date: Some(membership_date),
            membership_number: Some(membership_number),
            ..member
        })
        .await?;
    Ok(member)
}

/// End a membership
pub async fn record_membership_loss<DB>(
    db: &DB,
    member_id: u32,
    loss_date: NaiveDate,
    loss_type: MembershipLossType,
) -> Result<Member, MembershipError>
where
    DB: Retrieve<Member, Key = u32> + Update<Member> + Send + Sync,
{
    let member = db.retrieve(member_id).await?;
    let Some(membership_date) = member.membership_date.filter(|_| member.membership_accepted)
    else {
        return Err(MembershipError::NotAMember(member_id));
    };
    if member.membership_loss_date.is_some() {
        return Err(MembershipError::AlreadyLost(member_id));
    }
    if loss_date < membership_date {
        return Err(MembershipError::LossBeforeMembership(
            loss_date,
            membership_date,
        ));
    }

    let member = db
        .update(Member {
            membership_loss_date: Some(loss_date),
            membership_loss_type: Some(loss_type),
            ..member
        })
        .await?;
    tracing::info!(member_id, %loss_date, %loss_type, "membership ended");
    Ok(member)
}
