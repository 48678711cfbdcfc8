use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use c3s_data::{
    Dues, DuesFilter, DuesInvoice, DuesInvoiceFilter, Insert, Query, Retrieve, Transaction,
    Update,
};
use c3s_db::Connection;

/// Passes everything through to the database, except that
/// the n-th invoice insert fails.
pub struct FailingStore {
    pub db: Connection,
    pub fail_at: usize,
    invoice_inserts: AtomicUsize,
}

impl FailingStore {
    pub fn new(db: &Connection, fail_at: usize) -> Self {
        Self {
            db: db.clone(),
            fail_at,
            invoice_inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Query<Dues> for FailingStore {
    type Filter = DuesFilter;

    async fn query(&self, filter: &DuesFilter) -> Result<Vec<Dues>> {
        Query::<Dues>::query(&self.db, filter).await
    }
}

#[async_trait]
impl Insert<Dues> for FailingStore {
    async fn insert(&self, dues: Dues) -> Result<Dues> {
        self.db.insert(dues).await
    }
}

#[async_trait]
impl Update<Dues> for FailingStore {
    async fn update(&self, dues: Dues) -> Result<Dues> {
        self.db.update(dues).await
    }
}

#[async_trait]
impl Query<DuesInvoice> for FailingStore {
    type Filter = DuesInvoiceFilter;

    async fn query(&self, filter: &DuesInvoiceFilter) -> Result<Vec<DuesInvoice>> {
        Query::<DuesInvoice>::query(&self.db, filter).await
    }
}

#[async_trait]
impl Retrieve<DuesInvoice> for FailingStore {
    type Key = (i32, u32);

    async fn retrieve(&self, key: (i32, u32)) -> Result<DuesInvoice> {
        Retrieve::<DuesInvoice>::retrieve(&self.db, key).await
    }
}

#[async_trait]
impl Insert<DuesInvoice> for FailingStore {
    async fn insert(&self, invoice: DuesInvoice) -> Result<DuesInvoice> {
        let n = self.invoice_inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_at {
            return Err(anyhow!("disk full"));
        }
        self.db.insert(invoice).await
    }
}

#[async_trait]
impl Update<DuesInvoice> for FailingStore {
    async fn update(&self, invoice: DuesInvoice) -> Result<DuesInvoice> {
        self.db.update(invoice).await
    }
}

#[async_trait]
impl Transaction for FailingStore {
    async fn begin(&self) -> Result<()> {
        self.db.begin().await
    }

    async fn commit(&self) -> Result<()> {
        self.db.commit().await
    }

    async fn rollback(&self) -> Result<()> {
        self.db.rollback().await
    }
}
