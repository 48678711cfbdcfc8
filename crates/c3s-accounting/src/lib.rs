use c3s_data::{
    Dues, DuesFilter, DuesInvoice, DuesInvoiceFilter, Insert, Query, Retrieve, Transaction,
    Update,
};

pub mod calculation;
pub mod datetime;
pub mod errors;
pub mod invoicing;
pub mod payment;
pub mod reduction;
pub mod repository;

#[cfg(test)]
mod testing;

pub use calculation::{CalculateDues, DuesSchedule};
pub use errors::DuesError;
pub use repository::{DuesInvoiceRepository, MonthlyStats};

/// Storage required by the dues bookkeeping. Every operation
/// runs in one transaction.
pub trait DuesStore:
    Query<Dues, Filter = DuesFilter>
    + Insert<Dues>
    + Update<Dues>
    + Query<DuesInvoice, Filter = DuesInvoiceFilter>
    + Retrieve<DuesInvoice, Key = (i32, u32)>
    + Insert<DuesInvoice>
    + Update<DuesInvoice>
    + Transaction
    + Send
    + Sync
{
}

impl<DB> DuesStore for DB where
    DB: Query<Dues, Filter = DuesFilter>
        + Insert<Dues>
        + Update<Dues>
        + Query<DuesInvoice, Filter = DuesInvoiceFilter>
        + Retrieve<DuesInvoice, Key = (i32, u32)>
        + Insert<DuesInvoice>
        + Update<DuesInvoice>
        + Transaction
        + Send
        + Sync
{
}

/// Look up the dues record of a member for a year
pub(crate) async fn find_dues<DB: DuesStore>(
    db: &DB,
    member_id: u32,
    year: i32,
) -> anyhow::Result<Option<Dues>> {
    let mut dues: Vec<Dues> = db
        .query(&DuesFilter {
            member_id: Some(member_id),
            year: Some(year),
            ..Default::default()
        })
        .await?;
    Ok(dues.pop())
}
