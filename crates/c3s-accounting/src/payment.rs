use chrono::NaiveDate;
use rust_decimal::Decimal;

use c3s_data::Dues;

use crate::{errors::DuesError, find_dues, DuesStore};

/// Record a dues payment of a member for a year.
///
/// The amount is booked as is. Partial payments and
/// overpayments remain visible in the balance.
pub async fn record_dues_payment<DB: DuesStore>(
    db: &DB,
    member_id: u32,
    year: i32,
    amount: Decimal,
    paid_date: NaiveDate,
) -> Result<Dues, DuesError> {
    db.begin().await?;
    let result = write_dues_payment(db, member_id, year, amount, paid_date).await;
    db.finish(result).await
}

async fn write_dues_payment<DB: DuesStore>(
    db: &DB,
    member_id: u32,
    year: i32,
    amount: Decimal,
    paid_date: NaiveDate,
) -> Result<Dues, DuesError> {
    let mut dues = find_dues(db, member_id, year)
        .await?
        .ok_or(DuesError::NoDues(member_id, year))?;

    dues.record_payment(amount, paid_date);
    let dues = db.update(dues).await?;

    tracing::info!(
        member_id,
        year,
        %amount,
        balance = %dues.balance,
        "recorded dues payment"
    );
    Ok(dues)
}
