use chrono::NaiveDate;
use thiserror::Error as ThisError;

/// Violations of the membership rules
#[derive(ThisError, Debug)]
pub enum MembershipError {
    #[error("invalid application: {0}")]
    InvalidApplication(String),

    #[error("an application with email {0} already exists")]
    DuplicateEmail(String),

    #[error("membership of {0} was already accepted")]
    AlreadyAccepted(u32),

    #[error("the signed application of {0} was not received")]
    SignatureMissing(u32),

    #[error("the share payment of {0} was not received")]
    PaymentMissing(u32),

    #[error("{0} is not a member")]
    NotAMember(u32),

    #[error("membership of {0} already ended")]
    AlreadyLost(u32),

    #[error("loss date {0} is before the membership date {1}")]
    LossBeforeMembership(NaiveDate, NaiveDate),

    #[error("{0} shares requested, but {1} of at most {2} are held already")]
    TooManyShares(u32, u32, u32),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

/// Violations of the general assembly rules
#[derive(ThisError, Debug)]
pub enum AssemblyError {
    #[error("general assembly {0} does not exist")]
    NotFound(u32),

    #[error("general assembly {0} took place on {1}, invitations are closed")]
    InPast(u32, NaiveDate),

    #[error("member {0} is not a member at the assembly date")]
    NotAMember(u32),

    #[error("the assembly name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}
