use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection, Executor,
};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use c3s_data::Transaction;

use crate::schema;

/// Removes the test database file once the last
/// connection handle is gone.
struct TestHandle {
    filename: String,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection {
    conn: Arc<Mutex<SqliteConnection>>,
    // Held from begin to commit or rollback
    tx_gate: Arc<Mutex<()>>,
    tx_guard: Arc<Mutex<Option<OwnedMutexGuard<()>>>>,
    _handle: Option<Arc<TestHandle>>,
}

impl Connection {
    /// Open a connection to the database
    pub async fn open(filename: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&opts).await?;
        tracing::debug!(filename, "opened members database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            tx_gate: Arc::new(Mutex::new(())),
            tx_guard: Arc::new(Mutex::new(None)),
            _handle: None,
        })
    }

    /// Open a new test database connection.
    /// The database will be created on each open and
    /// removed when the connection is dropped.
    pub async fn open_test() -> Self {
        let filename = format!("/tmp/c3s_test_{}.sqlite3", rand::random::<u64>());
        let handle = TestHandle {
            filename: filename.clone(),
        };
        let mut conn = Self::open(&filename).await.unwrap();
        conn._handle = Some(Arc::new(handle));

        // Install the schema
        schema::install(&conn).await.unwrap();

        conn
    }

    /// Acquire the underlying connection
    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }
}

#[async_trait]
impl Transaction for Connection {
    /// Start a write transaction. Waits until a transaction
    /// running on another handle of this connection has ended.
    async fn begin(&self) -> Result<()> {
        let guard = self.tx_gate.clone().lock_owned().await;
        {
            let mut conn = self.lock().await;
            (*conn).execute("BEGIN IMMEDIATE").await?;
        }
        *self.tx_guard.lock().await = Some(guard);
        tracing::trace!("transaction started");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut guard = self.tx_guard.lock().await;
        if guard.is_none() {
            return Err(anyhow!("commit without transaction"));
        }
        {
            let mut conn = self.lock().await;
            if let Err(err) = (*conn).execute("COMMIT").await {
                (*conn).execute("ROLLBACK").await?;
                guard.take();
                return Err(err.into());
            }
        }
        guard.take();
        tracing::trace!("transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut guard = self.tx_guard.lock().await;
        if guard.is_none() {
            return Err(anyhow!("rollback without transaction"));
        }
        {
            let mut conn = self.lock().await;
            (*conn).execute("ROLLBACK").await?;
        }
        guard.take();
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}
