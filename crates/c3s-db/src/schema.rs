use anyhow::Result;
use sqlx::Executor;

use crate::Connection;

/// Install the database schema.
pub async fn install(conn: &Connection) -> Result<()> {
    let mut conn = conn.lock().await;
    let schema_data = include_str!("../db/schema.sql");
    tracing::info!("installing database schema");
    (*conn).execute(schema_data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_is_repeatable() {
        let conn = Connection::open_test().await;
        // The schema was installed on open, again must not fail.
        install(&conn).await.unwrap();
    }
}
