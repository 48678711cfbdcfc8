use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error as ThisError;

/// Violations of the dues bookkeeping rules
#[derive(ThisError, Debug)]
pub enum DuesError {
    #[error("membership date {0} is after the dues year {1}, no dues applicable")]
    NotApplicable(NaiveDate, i32),

    #[error("member {0} has no membership date")]
    NoMembershipDate(u32),

    #[error("member {0} was not a member in {1}")]
    NotAMember(u32, i32),

    #[error("dues {1} of member {0} were already invoiced")]
    AlreadyInvoiced(u32, i32),

    #[error("member {0} has no dues for {1}")]
    NoDues(u32, i32),

    #[error("dues {1} of member {0} were not invoiced yet")]
    NotInvoiced(u32, i32),

    #[error("the reduction was not confirmed")]
    NotConfirmed,

    #[error("the reduced amount {0} must not be negative")]
    NegativeAmount(Decimal),

    #[error("the reduced amount {0} is the amount already charged")]
    AmountUnchanged(Decimal),

    #[error("the reduced amount {0} exceeds the amount charged ({1})")]
    ExceedsAmount(Decimal, Decimal),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}
