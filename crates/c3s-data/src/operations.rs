use anyhow::Result;
use async_trait::async_trait;

/// Fetch all records matching a filter
#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

/// Fetch exactly one record by its key
#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

/// Store a new record, returning it as persisted
#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

/// Write back a changed record, returning it as persisted
#[async_trait]
pub trait Update<T> {
    async fn update(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Delete<T> {
    async fn delete(&self, item: T) -> Result<()>;
}

/// Group several writes into one unit of work.
///
/// Between `begin` and `commit` no other unit of work can start
/// on the same store. After `rollback` none of the writes remain.
#[async_trait]
pub trait Transaction {
    async fn begin(&self) -> Result<()>;
    async fn commit(&self) -> Result<()>;
    async fn rollback(&self) -> Result<()>;

    /// Commit if the work succeeded, roll back otherwise.
    /// The error of the work takes precedence over a failed rollback.
    async fn finish<T, E>(&self, result: std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        T: Send,
        E: From<anyhow::Error> + Send,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
