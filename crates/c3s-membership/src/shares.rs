use chrono::NaiveDate;

use c3s_data::{
    count_shares, make_token, Insert, Member, Query, Retrieve, Shares, SharesFilter, Transaction,
    Update, MAX_SHARES_PER_MEMBER,
};

use crate::errors::MembershipError;

/// Record an additional package of shares for a member.
/// The total of all packages may not exceed the per member limit.
pub async fn acquire_shares<DB>(
    db: &DB,
    member_id: u32,
    number: u32,
    date: NaiveDate,
) -> Result<(Member, Shares), MembershipError>
where
    DB: Retrieve<Member, Key = u32>
        + Update<Member>
        + Query<Shares, Filter = SharesFilter>
        + Insert<Shares>
        + Transaction
        + Send
        + Sync,
{
    db.begin().await?;
    let result = write_shares(db, member_id, number, date).await;
    let (member, shares) = db.finish(result).await?;

    tracing::info!(member_id, number, total = member.num_shares, "shares acquired");
    Ok((member, shares))
}

async fn write_shares<DB>(
    db: &DB,
    member_id: u32,
    number: u32,
    date: NaiveDate,
) -> Result<(Member, Shares), MembershipError>
where
    DB: Retrieve<Member, Key = u32>
        + Update<Member>
        + Query<Shares, Filter = SharesFilter>
        + Insert<Shares>
        + Send
        + Sync,
{
    let member = db.retrieve(member_id).await?;
    if !member.is_member(date) {
        return Err(MembershipError::NotAMember(member_id));
    }
    if number == 0 {
        return Err(MembershipError::InvalidApplication(
            "at least one share must be acquired".to_string(),
        ));
    }

    let held = count_shares(&member.get_shares(db).await?);
    if held + number > MAX_SHARES_PER_MEMBER {
        return Err(MembershipError::TooManyShares(
            number,
            held,
            MAX_SHARES_PER_MEMBER,
        ));
    }

    let shares = db
        .insert(Shares {
            member_id,
            number,
            date_of_acquisition: date,
            reference_code: make_token(),
            ..Default::default()
        })
        .await?;
    let member = db
        .update(Member {
            num_shares: held + number,
            ..member
        })
        .await?;
    Ok((member, shares))
}
